//! Database seeding for integration tests.
//!
//! Reference data (categories, regions, cities) comes from the migrations;
//! these helpers add users, installers and reviews on top.

use anyhow::Context as _;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn create_user(pool: &PgPool, name: &str, role: &str) -> anyhow::Result<Uuid> {
    let email = format!("{}@example.ro", Uuid::new_v4().simple());
    sqlx::query_scalar("INSERT INTO users (email, name, role) VALUES ($1, $2, $3) RETURNING id")
        .bind(email)
        .bind(name)
        .bind(role)
        .fetch_one(pool)
        .await
        .context("insert user")
}

/// Seed for an installer profile. Defaults to a completed, available
/// profile with no offerings or areas.
#[derive(Debug, Clone)]
pub struct InstallerSeed {
    pub owner_name: String,
    pub business_name: Option<String>,
    pub bio: Option<String>,
    pub years_experience: Option<i32>,
    pub is_verified: bool,
    pub is_available: bool,
    pub profile_completed: bool,
    pub services: Vec<(String, bool)>,
    pub cities: Vec<String>,
}

impl InstallerSeed {
    pub fn new(business_name: &str) -> Self {
        Self {
            owner_name: format!("Owner of {business_name}"),
            business_name: Some(business_name.to_string()),
            bio: None,
            years_experience: Some(5),
            is_verified: false,
            is_available: true,
            profile_completed: true,
            services: Vec::new(),
            cities: Vec::new(),
        }
    }

    pub fn owner(mut self, name: &str) -> Self {
        self.owner_name = name.to_string();
        self
    }

    pub fn bio(mut self, bio: &str) -> Self {
        self.bio = Some(bio.to_string());
        self
    }

    pub fn verified(mut self) -> Self {
        self.is_verified = true;
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.is_available = false;
        self
    }

    pub fn incomplete(mut self) -> Self {
        self.profile_completed = false;
        self
    }

    /// Offer the category with this slug.
    pub fn service(mut self, slug: &str, primary: bool) -> Self {
        self.services.push((slug.to_string(), primary));
        self
    }

    pub fn city(mut self, name: &str) -> Self {
        self.cities.push(name.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SeededInstaller {
    pub user_id: Uuid,
    pub profile_id: Uuid,
}

pub async fn create_installer(pool: &PgPool, seed: InstallerSeed) -> anyhow::Result<SeededInstaller> {
    let user_id = create_user(pool, &seed.owner_name, "installer").await?;

    let profile_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO installer_profiles
            (user_id, business_name, bio, years_experience, is_verified, is_available, profile_completed)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(&seed.business_name)
    .bind(&seed.bio)
    .bind(seed.years_experience)
    .bind(seed.is_verified)
    .bind(seed.is_available)
    .bind(seed.profile_completed)
    .fetch_one(pool)
    .await
    .context("insert installer profile")?;

    for (slug, primary) in &seed.services {
        let category = category_id(pool, slug).await?;
        sqlx::query(
            "INSERT INTO installer_services (installer_profile_id, service_category_id, is_primary) VALUES ($1, $2, $3)",
        )
        .bind(profile_id)
        .bind(category)
        .bind(primary)
        .execute(pool)
        .await
        .context("insert installer service")?;
    }

    for name in &seed.cities {
        let city = city_id(pool, name).await?;
        sqlx::query("INSERT INTO installer_service_areas (installer_profile_id, city_id) VALUES ($1, $2)")
            .bind(profile_id)
            .bind(city)
            .execute(pool)
            .await
            .context("insert service area")?;
    }

    Ok(SeededInstaller {
        user_id,
        profile_id,
    })
}

pub async fn create_review(
    pool: &PgPool,
    installer_id: Uuid,
    customer_id: Uuid,
    rating: i32,
) -> anyhow::Result<Uuid> {
    let category = category_id(pool, "instalatii-sanitare").await?;
    sqlx::query_scalar(
        r#"
        INSERT INTO reviews (installer_profile_id, customer_id, service_category_id, rating, title, comment)
        VALUES ($1, $2, $3, $4, 'Lucrare', 'Comentariu de test despre lucrare')
        RETURNING id
        "#,
    )
    .bind(installer_id)
    .bind(customer_id)
    .bind(category)
    .bind(rating)
    .fetch_one(pool)
    .await
    .context("insert review")
}

/// One review per rating, each from a fresh customer.
pub async fn create_reviews(pool: &PgPool, installer_id: Uuid, ratings: &[i32]) -> anyhow::Result<()> {
    for rating in ratings {
        let customer = create_user(pool, "Client", "customer").await?;
        create_review(pool, installer_id, customer, *rating).await?;
    }
    Ok(())
}

pub async fn category_id(pool: &PgPool, slug: &str) -> anyhow::Result<i32> {
    sqlx::query_scalar("SELECT id FROM service_categories WHERE slug = $1")
        .bind(slug)
        .fetch_one(pool)
        .await
        .with_context(|| format!("category {slug}"))
}

pub async fn city_id(pool: &PgPool, name: &str) -> anyhow::Result<i32> {
    sqlx::query_scalar("SELECT id FROM cities WHERE name = $1")
        .bind(name)
        .fetch_one(pool)
        .await
        .with_context(|| format!("city {name}"))
}

pub async fn region_id(pool: &PgPool, code: &str) -> anyhow::Result<i32> {
    sqlx::query_scalar("SELECT id FROM regions WHERE code = $1")
        .bind(code)
        .fetch_one(pool)
        .await
        .with_context(|| format!("region {code}"))
}

/// Stored state of a profile, for before/after comparisons.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StoredProfile {
    pub business_name: Option<String>,
    pub bio: Option<String>,
    pub years_experience: Option<i32>,
    pub is_available: bool,
    pub profile_completed: bool,
    pub version: i32,
}

pub async fn stored_profile(pool: &PgPool, profile_id: Uuid) -> anyhow::Result<StoredProfile> {
    sqlx::query_as(
        "SELECT business_name, bio, years_experience, is_available, profile_completed, version FROM installer_profiles WHERE id = $1",
    )
    .bind(profile_id)
    .fetch_one(pool)
    .await
    .context("load profile")
}

/// `(category_id, is_primary)` ordered by category id.
pub async fn stored_services(pool: &PgPool, profile_id: Uuid) -> anyhow::Result<Vec<(i32, bool)>> {
    sqlx::query_as(
        "SELECT service_category_id, is_primary FROM installer_services WHERE installer_profile_id = $1 ORDER BY service_category_id",
    )
    .bind(profile_id)
    .fetch_all(pool)
    .await
    .context("load services")
}

pub async fn stored_city_ids(pool: &PgPool, profile_id: Uuid) -> anyhow::Result<Vec<i32>> {
    sqlx::query_scalar(
        "SELECT city_id FROM installer_service_areas WHERE installer_profile_id = $1 ORDER BY city_id",
    )
    .bind(profile_id)
    .fetch_all(pool)
    .await
    .context("load service areas")
}
