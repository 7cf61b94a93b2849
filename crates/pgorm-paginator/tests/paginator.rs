use pgorm_paginator::{
    FromRow, Order, PageError, PageResult, Pagination, Paginator, RowExt, SelectStatement, Sort,
    select,
};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls, Row};

#[derive(Debug, PartialEq)]
struct Product {
    code: String,
    price: i64,
}

impl FromRow for Product {
    fn from_row(row: &Row) -> PageResult<Self> {
        Ok(Self {
            code: row.try_get_column("code")?,
            price: row.try_get_column("price")?,
        })
    }
}

async fn connect() -> PageResult<Option<Client>> {
    dotenvy::dotenv().ok();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => return Ok(None),
    };
    let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .map_err(PageError::from_db_error)?;
    tokio::spawn(async move {
        let _ = connection.await;
    });
    Ok(Some(client))
}

/// Create a uniquely named temporary table holding `products`.
async fn seed(client: &Client, products: &[(&str, i64)]) -> PageResult<String> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX_EPOCH")
        .as_nanos();
    let table = format!("paginator_products_{}_{}", std::process::id(), nanos);
    client
        .batch_execute(&format!(
            "CREATE TEMPORARY TABLE {table} (
                id BIGSERIAL PRIMARY KEY,
                code TEXT NOT NULL,
                price BIGINT NOT NULL
            )"
        ))
        .await
        .map_err(PageError::from_db_error)?;
    for (code, price) in products {
        client
            .execute(
                &format!("INSERT INTO {table} (code, price) VALUES ($1, $2)"),
                &[code as &(dyn ToSql + Sync), price],
            )
            .await
            .map_err(PageError::from_db_error)?;
    }
    Ok(table)
}

async fn fetch(
    client: &Client,
    stmt: &SelectStatement,
    pagination: &Pagination,
) -> PageResult<Vec<Product>> {
    let page = Paginator::new().fetch_page(client, stmt, pagination).await?;
    Ok(page.into_items())
}

#[tokio::test]
async fn totals_without_filters() -> PageResult<()> {
    let Some(client) = connect().await? else {
        eprintln!("DATABASE_URL is not set; skipping totals_without_filters");
        return Ok(());
    };

    let table = seed(&client, &[("1", 1)]).await?;
    let pagination = Pagination::unpaged();
    let items = fetch(&client, &select(&table), &pagination).await?;
    assert_eq!(items.len(), 1);
    assert_eq!(pagination.total_elements(), 1);
    assert_eq!(pagination.total_pages(), 1);

    let table = seed(&client, &[("1", 1), ("2", 2)]).await?;
    let pagination = Pagination::unpaged();
    fetch(&client, &select(&table), &pagination).await?;
    assert_eq!(pagination.total_elements(), 2);
    assert_eq!(pagination.total_pages(), 1);

    let pagination = Pagination::of(1, 1)?;
    let items = fetch(&client, &select(&table).order_by("id"), &pagination).await?;
    assert_eq!(items, vec![Product { code: "2".into(), price: 2 }]);
    assert_eq!(pagination.page(), 1);
    assert_eq!(pagination.size(), 1);
    assert_eq!(pagination.total_elements(), 2);
    assert_eq!(pagination.total_pages(), 2);
    Ok(())
}

#[tokio::test]
async fn totals_with_filters() -> PageResult<()> {
    let Some(client) = connect().await? else {
        eprintln!("DATABASE_URL is not set; skipping totals_with_filters");
        return Ok(());
    };

    let table = seed(&client, &[("1", 1)]).await?;
    let pagination = Pagination::unpaged();
    fetch(&client, &select(&table).lt("price", 100i64), &pagination).await?;
    assert_eq!((pagination.total_elements(), pagination.total_pages()), (1, 1));

    let pagination = Pagination::unpaged();
    let items = fetch(&client, &select(&table).gt("price", 100i64), &pagination).await?;
    assert!(items.is_empty());
    assert_eq!((pagination.total_elements(), pagination.total_pages()), (0, 1));

    let table = seed(&client, &[("1", 1), ("2", 2), ("1", 100), ("2", 200)]).await?;
    let pagination = Pagination::of(0, 1)?;
    let items = fetch(&client, &select(&table).gt("price", 50i64), &pagination).await?;
    assert_eq!(items.len(), 1);
    assert_eq!((pagination.total_elements(), pagination.total_pages()), (2, 2));
    Ok(())
}

#[tokio::test]
async fn sorted_pages() -> PageResult<()> {
    let Some(client) = connect().await? else {
        eprintln!("DATABASE_URL is not set; skipping sorted_pages");
        return Ok(());
    };

    let table = seed(&client, &[("a", 3), ("b", 1), ("c", 2), ("d", 2)]).await?;
    let sort: Sort = [Order::desc("price")?, Order::asc("code")?].into_iter().collect();
    let pagination = Pagination::of(0, 3)?.with_sort(sort);
    let items = fetch(&client, &select(&table), &pagination).await?;
    let codes: Vec<_> = items.iter().map(|p| p.code.as_str()).collect();
    assert_eq!(codes, ["a", "c", "d"]);
    assert!(pagination.has_next());

    let count = Paginator::new()
        .count(&client, &select(&table).distinct().select("price"), &Pagination::unpaged())
        .await?;
    assert_eq!(count, 3);
    Ok(())
}

#[tokio::test]
async fn unknown_sort_column_keeps_sqlstate() -> PageResult<()> {
    let Some(client) = connect().await? else {
        eprintln!("DATABASE_URL is not set; skipping unknown_sort_column_keeps_sqlstate");
        return Ok(());
    };

    let table = seed(&client, &[("a", 1)]).await?;
    let pagination = Pagination::of(0, 10)?.with_sort(Order::asc("no_such_column")?);
    let err = fetch(&client, &select(&table), &pagination)
        .await
        .unwrap_err();
    assert!(matches!(err, PageError::Query(_)));
    assert_eq!(err.code(), Some("42703"));
    Ok(())
}

#[tokio::test]
async fn generic_client_single_row_helpers() -> PageResult<()> {
    use pgorm_paginator::GenericClient;

    let Some(mut client) = connect().await? else {
        eprintln!("DATABASE_URL is not set; skipping generic_client_single_row_helpers");
        return Ok(());
    };

    let err = GenericClient::query_one(&client, "SELECT 1 WHERE false", &[])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(GenericClient::query_opt(&client, "SELECT 1 WHERE false", &[]).await?.is_none());

    let tx = client.transaction().await.map_err(PageError::from_db_error)?;
    let row = GenericClient::query_one(&tx, "SELECT $1::BIGINT AS n", &[&7i64]).await?;
    assert_eq!(row.try_get_column::<i64>("n")?, 7);
    tx.rollback().await.map_err(PageError::from_db_error)?;
    Ok(())
}
