use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::{QueryAs, QueryScalar};

use super::BindValue;

pub fn bind_query_as<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    values: Vec<BindValue>,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for value in values {
        query = match value {
            BindValue::Text(v) => query.bind(v),
            BindValue::Int(v) => query.bind(v),
            BindValue::BigInt(v) => query.bind(v),
            BindValue::Float(v) => query.bind(v),
            BindValue::Bool(v) => query.bind(v),
            BindValue::Uuid(v) => query.bind(v),
        };
    }
    query
}

pub fn bind_scalar<'q, O>(
    mut query: QueryScalar<'q, Postgres, O, PgArguments>,
    values: Vec<BindValue>,
) -> QueryScalar<'q, Postgres, O, PgArguments> {
    for value in values {
        query = match value {
            BindValue::Text(v) => query.bind(v),
            BindValue::Int(v) => query.bind(v),
            BindValue::BigInt(v) => query.bind(v),
            BindValue::Float(v) => query.bind(v),
            BindValue::Bool(v) => query.bind(v),
            BindValue::Uuid(v) => query.bind(v),
        };
    }
    query
}
