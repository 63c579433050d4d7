//! Page through a search in-process, the way a "load more" button would

use anyhow::Result;
use pawprint::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let store = InMemoryCatStore::new();
    let breeds = ["Siamese", "Bengal", "Ragdoll"];
    for i in 0..10u32 {
        let mut cat = CatRecord::from_new(
            NewCat {
                name: format!("Kitten {}", i),
                sex: if i % 2 == 0 { Sex::Female } else { Sex::Male },
                age_months: 2 + i % 4,
                breed: breeds[i as usize % breeds.len()].to_string(),
                vaccinated: i % 3 != 0,
                desexed: false,
                microchipped: true,
                description: None,
                primary_image_url: None,
            },
            None,
        );
        cat.created_at = Utc::now() - chrono::Duration::minutes(i64::from(i));
        store.insert(cat).await?;
    }

    let search = CatSearchService::new(Arc::new(store));
    let mut request = SearchRequest {
        vaccinated: Some(true),
        sort_by: SortBy::AgeMonths,
        sort_dir: SortDir::Asc,
        limit: 3,
        ..Default::default()
    };

    let mut page_number = 1;
    loop {
        let page = search.search(request.clone()).await?;
        println!("Page {}:", page_number);
        for cat in &page.items {
            println!("  {:<10} {:>2} months  {}", cat.name, cat.age_months, cat.breed);
        }

        match page.next_cursor {
            Some(cursor) => request = request.after(cursor),
            None => break,
        }
        page_number += 1;
    }

    Ok(())
}
