//! Binding [`Value`] parameters with `tokio-postgres`.
//!
//! Each value is checked against the parameter type the server asks for.
//! Integers and floats are narrowed only when the value survives the
//! conversion exactly; anything else is an error, never a silent truncation.

use crate::value::Value;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type};
use uuid::Uuid;

type BindResult = Result<IsNull, Box<dyn Error + Sync + Send>>;

fn mismatch(value: &Value, ty: &Type) -> Box<dyn Error + Sync + Send> {
    format!("cannot bind a {} value to a parameter of type {ty}", value.kind()).into()
}

/// Serialize `inner` after checking it can be read as `ty`.
fn bind<T: ToSql>(value: &Value, inner: &T, ty: &Type, out: &mut BytesMut) -> BindResult {
    if !T::accepts(ty) {
        return Err(mismatch(value, ty));
    }
    inner.to_sql(ty, out)
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> BindResult {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => bind(self, b, ty, out),
            Value::Int(i) => match *ty {
                Type::INT2 => bind(self, &i16::try_from(*i)?, ty, out),
                Type::INT4 => bind(self, &i32::try_from(*i)?, ty, out),
                _ => bind(self, i, ty, out),
            },
            Value::Float(f) => match *ty {
                Type::FLOAT4 => {
                    let narrowed = *f as f32;
                    if !f.is_nan() && f64::from(narrowed) != *f {
                        return Err(format!("{f} does not fit a float4 parameter exactly").into());
                    }
                    bind(self, &narrowed, ty, out)
                }
                _ => bind(self, f, ty, out),
            },
            Value::Text(s) => bind(self, s, ty, out),
            Value::Bytes(b) => bind(self, b, ty, out),
            Value::Uuid(u) => bind(self, u, ty, out),
            Value::Timestamp(t) => match *ty {
                Type::TIMESTAMP => bind(self, &t.naive_utc(), ty, out),
                _ => bind(self, t, ty, out),
            },
            Value::Date(d) => bind(self, d, ty, out),
            Value::Json(j) => bind(self, j, ty, out),
        }
    }

    /// Any type some variant can be bound to; the variant itself is checked
    /// in `to_sql`.
    fn accepts(ty: &Type) -> bool {
        <bool as ToSql>::accepts(ty)
            || matches!(*ty, Type::INT2 | Type::INT4 | Type::FLOAT4)
            || <i64 as ToSql>::accepts(ty)
            || <f64 as ToSql>::accepts(ty)
            || <String as ToSql>::accepts(ty)
            || <Vec<u8> as ToSql>::accepts(ty)
            || <Uuid as ToSql>::accepts(ty)
            || <DateTime<Utc> as ToSql>::accepts(ty)
            || <NaiveDateTime as ToSql>::accepts(ty)
            || <NaiveDate as ToSql>::accepts(ty)
            || <serde_json::Value as ToSql>::accepts(ty)
    }

    tokio_postgres::types::to_sql_checked!();
}
