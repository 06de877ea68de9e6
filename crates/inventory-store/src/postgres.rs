use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    ClassId, ClassRecord, DecrementResult, GrantedSeats, Money, NewOrder, OrderId, OrderRecord,
    Result, StoreError, store::InventoryStore,
};

const CLASS_COLUMNS: &str =
    "id, title, description, category, location, price_cents, rating, image, available_seats";

/// PostgreSQL-backed inventory store.
///
/// The guarded decrement is a single `UPDATE ... WHERE available_seats >= $2`,
/// so the condition is evaluated by the database at the moment of mutation.
#[derive(Clone)]
pub struct PostgresInventoryStore {
    pool: PgPool,
}

impl PostgresInventoryStore {
    /// Creates a new PostgreSQL inventory store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_class(row: &PgRow) -> Result<ClassRecord> {
        let rating: i16 = row.try_get("rating")?;
        let available: i64 = row.try_get("available_seats")?;

        Ok(ClassRecord {
            id: ClassId::new(row.try_get::<String, _>("id")?),
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            category: row.try_get("category")?,
            location: row.try_get("location")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            rating: u8::try_from(rating)
                .map_err(|_| StoreError::InvalidRecord(format!("rating out of range: {rating}")))?,
            image: row.try_get("image")?,
            available_seats: seats_from_column(available)?,
        })
    }
}

fn seats_from_column(value: i64) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| StoreError::InvalidRecord(format!("seat count out of range: {value}")))
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    #[tracing::instrument(skip(self))]
    async fn conditional_decrement(
        &self,
        class_id: &ClassId,
        seats: u32,
    ) -> Result<DecrementResult> {
        let sql = format!(
            "UPDATE classes SET available_seats = available_seats - $2 \
             WHERE id = $1 AND available_seats >= $2 \
             RETURNING {CLASS_COLUMNS}"
        );

        let row: Option<PgRow> = sqlx::query(&sql)
            .bind(class_id.as_str())
            .bind(i64::from(seats))
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(DecrementResult::Applied(Self::row_to_class(&row)?)),
            None => Ok(DecrementResult::NotSatisfied),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn unconditional_increment(&self, class_id: &ClassId, seats: u32) -> Result<()> {
        let result =
            sqlx::query("UPDATE classes SET available_seats = available_seats + $2 WHERE id = $1")
                .bind(class_id.as_str())
                .bind(i64::from(seats))
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            tracing::warn!(%class_id, seats, "increment matched no class");
        }
        Ok(())
    }

    async fn find_class(&self, class_id: &ClassId) -> Result<Option<ClassRecord>> {
        let sql = format!("SELECT {CLASS_COLUMNS} FROM classes WHERE id = $1");
        let row: Option<PgRow> = sqlx::query(&sql)
            .bind(class_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_class).transpose()
    }

    #[tracing::instrument(skip(self, order), fields(items = order.items.len()))]
    async fn insert_order(&self, order: NewOrder) -> Result<OrderRecord> {
        let order_id = OrderId::new();

        // Header and line items land together or not at all.
        let mut tx = self.pool.begin().await?;

        let created_at: DateTime<Utc> = sqlx::query_scalar(
            r#"
            INSERT INTO orders (id, name, phone)
            VALUES ($1, $2, $3)
            RETURNING created_at
            "#,
        )
        .bind(order_id.as_uuid())
        .bind(&order.name)
        .bind(&order.phone)
        .fetch_one(&mut *tx)
        .await?;

        for (position, item) in order.items.iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| StoreError::InvalidRecord("too many order items".to_string()))?;
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, position, class_id, seats)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(order_id.as_uuid())
            .bind(position)
            .bind(item.class_id.as_str())
            .bind(i64::from(item.seats))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(OrderRecord {
            id: order_id,
            name: order.name,
            phone: order.phone,
            items: order.items,
            created_at,
        })
    }

    async fn insert_class(&self, class: ClassRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO classes (id, title, description, category, location, price_cents, rating, image, available_seats)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(class.id.as_str())
        .bind(&class.title)
        .bind(&class.description)
        .bind(&class.category)
        .bind(&class.location)
        .bind(class.price.cents())
        .bind(i16::from(class.rating))
        .bind(&class.image)
        .bind(i64::from(class.available_seats))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StoreError::DuplicateClass(class.id.clone());
            }
            StoreError::Database(e)
        })?;

        Ok(())
    }

    async fn list_classes(&self) -> Result<Vec<ClassRecord>> {
        let sql = format!("SELECT {CLASS_COLUMNS} FROM classes ORDER BY id ASC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_class).collect()
    }

    async fn list_orders(&self) -> Result<Vec<OrderRecord>> {
        // Headers and items come from one snapshot so a concurrent insert is
        // either fully visible or not at all.
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let item_rows = sqlx::query(
            r#"
            SELECT order_id, class_id, seats
            FROM order_items
            ORDER BY order_id, position ASC
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let order_rows = sqlx::query(
            r#"
            SELECT id, name, phone, created_at
            FROM orders
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut items: HashMap<Uuid, Vec<GrantedSeats>> = HashMap::new();
        for row in item_rows {
            let order_id: Uuid = row.try_get("order_id")?;
            let seats: i64 = row.try_get("seats")?;
            items.entry(order_id).or_default().push(GrantedSeats {
                class_id: ClassId::new(row.try_get::<String, _>("class_id")?),
                seats: seats_from_column(seats)?,
            });
        }

        order_rows
            .into_iter()
            .map(|row| -> Result<OrderRecord> {
                let id: Uuid = row.try_get("id")?;
                Ok(OrderRecord {
                    id: OrderId::from_uuid(id),
                    name: row.try_get("name")?,
                    phone: row.try_get("phone")?,
                    items: items.remove(&id).unwrap_or_default(),
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }
}
