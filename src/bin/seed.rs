use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use suitesync_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let admin_id = ensure_user(&pool, "admin@suitesync.test", "admin123", "admin").await?;
    let staff_id = ensure_user(&pool, "frontdesk@suitesync.test", "staff123", "staff").await?;
    let guest_id = ensure_user(&pool, "guest@suitesync.test", "guest123", "guest").await?;
    seed_rooms(&pool).await?;

    println!("Seed completed. Admin: {admin_id}, Staff: {staff_id}, Guest: {guest_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let name = email.split('@').next().unwrap_or("user");

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, phone, address, password_hash, role)
        VALUES ($1, $2, $3, '000-0000', 'Seed Street 1', $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    Ok(user_id)
}

async fn seed_rooms(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let rooms: [(i32, &str, i64, i32, i32, &str); 4] = [
        (101, "Standard", 9_900, 2, 22, "Queen"),
        (102, "Standard", 9_900, 2, 22, "Twin"),
        (201, "Deluxe", 15_900, 3, 32, "King"),
        (301, "Suite", 24_900, 4, 48, "King"),
    ];

    for (number, room_type, price, capacity, size, bed_type) in rooms {
        sqlx::query(
            r#"
            INSERT INTO rooms (id, room_number, room_type, image, price, capacity, size,
                               bed_type, services, description, status)
            VALUES ($1, $2, $3, 'seed-image', $4, $5, $6, $7,
                    'WiFi, Breakfast', 'Seeded room', 'Available')
            ON CONFLICT (room_number) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(number)
        .bind(room_type)
        .bind(price)
        .bind(capacity)
        .bind(size)
        .bind(bed_type)
        .execute(pool)
        .await?;
    }

    Ok(())
}
