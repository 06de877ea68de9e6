//! Sample catalog used to populate an empty store.

use crate::{ClassId, ClassRecord, Money, Result, StoreError, store::InventoryStore};

struct SeedClass {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    price_cents: i64,
    image: &'static str,
    available_seats: u32,
    rating: u8,
    category: &'static str,
    location: &'static str,
}

const CATALOG: &[SeedClass] = &[
    SeedClass {
        id: "mathematics-advanced",
        title: "Mathematics Advanced",
        description: "Advanced mathematics covering algebra, calculus and statistics",
        price_cents: 4500,
        image: "images/maths.jpg",
        available_seats: 10,
        rating: 5,
        category: "Maths",
        location: "London",
    },
    SeedClass {
        id: "english-literature",
        title: "English Literature",
        description: "Classic and modern literature analysis and creative writing",
        price_cents: 3500,
        image: "images/eng.jpg",
        available_seats: 8,
        rating: 4,
        category: "English",
        location: "Manchester",
    },
    SeedClass {
        id: "music-theory",
        title: "Music Theory",
        description: "Learn music notation, composition and harmony fundamentals",
        price_cents: 4000,
        image: "images/music.png",
        available_seats: 5,
        rating: 5,
        category: "Music",
        location: "Birmingham",
    },
    SeedClass {
        id: "world-history",
        title: "World History",
        description: "Explore ancient civilizations to modern world events",
        price_cents: 3800,
        image: "images/history.jpg",
        available_seats: 12,
        rating: 4,
        category: "History",
        location: "London",
    },
    SeedClass {
        id: "english-grammar",
        title: "English Grammar",
        description: "Master English grammar, punctuation and sentence structure",
        price_cents: 3000,
        image: "images/lit.jfif",
        available_seats: 15,
        rating: 4,
        category: "English",
        location: "Leeds",
    },
    SeedClass {
        id: "music-performance",
        title: "Music Performance",
        description: "Practical music lessons for various instruments and vocals",
        price_cents: 5000,
        image: "images/limp.jpg",
        available_seats: 6,
        rating: 5,
        category: "Music",
        location: "Manchester",
    },
    SeedClass {
        id: "british-history",
        title: "British History",
        description: "Comprehensive study of British history from medieval to modern times",
        price_cents: 4200,
        image: "images/british.jpg",
        available_seats: 9,
        rating: 5,
        category: "History",
        location: "Birmingham",
    },
    SeedClass {
        id: "mathematics-gcse",
        title: "Mathematics GCSE",
        description: "GCSE level mathematics preparation and practice",
        price_cents: 3500,
        image: "images/gcse.png",
        available_seats: 3,
        rating: 4,
        category: "Maths",
        location: "Leeds",
    },
];

/// Returns the sample catalog of scheduled classes.
pub fn default_catalog() -> Vec<ClassRecord> {
    CATALOG
        .iter()
        .map(|seed| ClassRecord {
            id: ClassId::new(seed.id),
            title: seed.title.to_string(),
            description: seed.description.to_string(),
            category: seed.category.to_string(),
            location: seed.location.to_string(),
            price: Money::from_cents(seed.price_cents),
            rating: seed.rating,
            image: seed.image.to_string(),
            available_seats: seed.available_seats,
        })
        .collect()
}

/// Inserts every class of the sample catalog that the store does not hold yet.
///
/// Existing classes keep their current seat counts. Returns how many were added.
#[tracing::instrument(skip(store))]
pub async fn seed_catalog<S: InventoryStore + ?Sized>(store: &S) -> Result<usize> {
    let mut inserted = 0;
    for class in default_catalog() {
        match store.insert_class(class).await {
            Ok(()) => inserted += 1,
            Err(StoreError::DuplicateClass(id)) => {
                tracing::debug!(class_id = %id, "class already present, skipping");
            }
            Err(e) => return Err(e),
        }
    }
    tracing::info!(inserted, "catalog seeded");
    Ok(inserted)
}
