use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use timber_cli::fixtures::{mock_documents, SeedUser, SEED_USERS};
use timber_cli::init_tracing;
use timber_core::models::{
    CreateAssetRequest, CreateDebtRequest, DocumentOutcome, SubscriptionStatus,
    SubscriptionUpdate, UpdateProfileRequest,
};
use timber_db::{
    AssetRepository, DebtRepository, DocumentRepository, NewDocument, ProfileRepository,
    UserRepository,
};

#[derive(Parser, Debug)]
#[command(name = "timber-seed")]
#[command(about = "Create test users with realistic financial profiles")]
struct Args {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// RNG seed for reproducible mock documents
    #[arg(long)]
    seed: Option<u64>,

    /// Run pending migrations before seeding
    #[arg(long)]
    migrate: bool,
}

struct Repositories {
    users: UserRepository,
    profiles: ProfileRepository,
    debts: DebtRepository,
    assets: AssetRepository,
    documents: DocumentRepository,
}

impl Repositories {
    fn new(pool: &PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            profiles: ProfileRepository::new(pool.clone()),
            debts: DebtRepository::new(pool.clone()),
            assets: AssetRepository::new(pool.clone()),
            documents: DocumentRepository::new(pool.clone()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&args.database_url)
        .await
        .context("Failed to connect to database")?;

    if args.migrate {
        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    // Seeded users are recreated from scratch; their rows cascade
    let ids: Vec<String> = SEED_USERS.iter().map(|u| u.id.to_string()).collect();
    let removed = sqlx::query("DELETE FROM users WHERE id = ANY($1)")
        .bind(&ids)
        .execute(&pool)
        .await
        .context("Failed to remove previous seed users")?
        .rows_affected();
    if removed > 0 {
        tracing::info!(removed, "Removed previously seeded users");
    }

    let repos = Repositories::new(&pool);
    let today = chrono::Utc::now().date_naive();

    for user in &SEED_USERS {
        seed_user(&repos, user)
            .await
            .with_context(|| format!("Failed to seed {}", user.id))?;

        let documents = mock_documents(&mut rng, user.profile, user.document_count, today)?;
        let mut flagged = 0;
        for doc in &documents {
            let created = repos
                .documents
                .create(NewDocument {
                    user_id: user.id,
                    file_name: &doc.file_name,
                    file_type: doc.file_type,
                    document_type: doc.document_type,
                    size_bytes: doc.size_bytes,
                })
                .await?;
            let analysis_data = doc
                .analysis
                .as_ref()
                .map(serde_json::to_value)
                .transpose()?;
            repos
                .documents
                .record_outcome(
                    created.id,
                    &DocumentOutcome {
                        status: doc.status,
                        pages: doc.pages,
                        analysis_data,
                        needs_review: doc.needs_review,
                    },
                )
                .await?;
            flagged += usize::from(doc.needs_review);
        }

        tracing::info!(
            user_id = user.id,
            documents = documents.len(),
            needs_review = flagged,
            "Mock documents created"
        );
    }

    println!("Test users:");
    for user in &SEED_USERS {
        println!(
            "  {:<28} {:>2} debts  ${:>9} owed  ${:>9} in assets  {} documents",
            user.email,
            user.debts.len(),
            user.total_debt(),
            user.total_assets(),
            user.document_count
        );
    }

    Ok(())
}

async fn seed_user(repos: &Repositories, user: &SeedUser) -> Result<()> {
    repos.users.upsert(user.id, Some(user.email)).await?;
    repos
        .users
        .update_names(user.id, Some(user.first_name), Some(user.last_name))
        .await?;
    repos
        .users
        .update_subscription(
            user.id,
            &SubscriptionUpdate {
                plan: user.plan,
                status: SubscriptionStatus::Active,
                stripe_customer_id: None,
                stripe_subscription_id: None,
            },
        )
        .await?;

    for (index, debt) in user.debts.iter().enumerate() {
        repos
            .debts
            .create(
                user.id,
                &CreateDebtRequest {
                    creditor: debt.creditor.to_string(),
                    debt_type: debt.debt_type,
                    current_balance: Decimal::from(debt.balance),
                    original_balance: Some(user.original_balance(debt)),
                    apr: debt.apr(),
                    minimum_payment: Decimal::from(debt.minimum_payment),
                    due_day: Some((index as i32 * 7) % 28 + 1),
                },
            )
            .await?;
    }

    for asset in user.assets {
        repos
            .assets
            .create(
                user.id,
                &CreateAssetRequest {
                    name: asset.name.to_string(),
                    asset_type: asset.asset_type,
                    current_value: Decimal::from(asset.value),
                    details: None,
                },
            )
            .await?;
    }

    repos
        .profiles
        .upsert(
            user.id,
            &UpdateProfileRequest {
                monthly_income: Some(Decimal::from(user.monthly_income)),
                monthly_expenses: None,
                credit_score: Some(user.credit_score),
            },
        )
        .await?;

    tracing::info!(
        user_id = user.id,
        debts = user.debts.len(),
        total_debt = user.total_debt(),
        total_assets = user.total_assets(),
        "Seeded user profile"
    );
    Ok(())
}
