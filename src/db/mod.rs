pub mod model;
pub mod controller;

use sea_orm::{Database, DbConn, DbErr, Schema, ConnectionTrait, TransactionTrait};

/// Primary keys and references of every table
pub type IDType = i64;

/// Unix timestamp stamped on writes
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub async fn start_db(url: &str) -> Result<DbConn, DbErr> {
    let db = Database::connect(url).await?;
    check_tables(&db).await?;
    Ok(db)
}

async fn check_tables(db: &DbConn) -> Result<(), DbErr> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let transaction = db.begin().await?;

    transaction.execute(builder.build(schema.create_table_from_entity(model::Overview).if_not_exists())).await?;
    transaction.execute(builder.build(schema.create_table_from_entity(model::Category).if_not_exists())).await?;
    transaction.execute(builder.build(schema.create_table_from_entity(model::Mapping).if_not_exists())).await?;
    transaction.execute(builder.build(schema.create_table_from_entity(model::course::Group).if_not_exists())).await?;
    transaction.commit().await?;
    
    Ok(())
}
