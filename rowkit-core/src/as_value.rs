use crate::{Error, Result, Value, truncate_long};
use anyhow::Context;
use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};
use std::{any, borrow::Cow, fmt::Display, str::FromStr, sync::Arc};
use time::{Date, PrimitiveDateTime, Time, macros::format_description};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`] used for
/// parameters and row decoding.
///
/// `try_from_value` accepts the canonical variant of the type and also the shapes
/// drivers commonly hand back: integers of any width (range checked), and text for
/// uuids, decimals and temporal types.
///
/// ```rust
/// use rowkit_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert_eq!(v, Value::Int32(Some(42)));
/// let n: i64 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// The typed null of this type.
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&'static str> for Value {
    fn from(value: &'static str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

fn mismatch<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {} value {} into {}",
        value.type_name(),
        truncate_long!(value.to_string()),
        any::type_name::<T>()
    ))
}

fn convert_integer<S, T>(value: T) -> Result<S>
where
    S: TryFrom<T>,
    T: Display + Copy,
{
    S::try_from(value).map_err(|_| {
        Error::msg(format!(
            "Value {} is out of range for {}",
            value,
            any::type_name::<S>()
        ))
    })
}

fn parse_text<T>(value: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse::<T>().with_context(|| {
        format!(
            "Cannot parse `{}` as {}",
            truncate_long!(value),
            any::type_name::<T>()
        )
    })
}

macro_rules! impl_as_value_integer {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            #[allow(unreachable_patterns)]
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v),
                    Value::Int8(Some(v)) => convert_integer(v),
                    Value::Int16(Some(v)) => convert_integer(v),
                    Value::Int32(Some(v)) => convert_integer(v),
                    Value::Int64(Some(v)) => convert_integer(v),
                    Value::UInt8(Some(v)) => convert_integer(v),
                    Value::UInt16(Some(v)) => convert_integer(v),
                    Value::UInt32(Some(v)) => convert_integer(v),
                    Value::UInt64(Some(v)) => convert_integer(v),
                    Value::Boolean(Some(v)) => Ok(v as _),
                    Value::Varchar(Some(ref v)) => parse_text(v),
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
        }
    };
}

impl_as_value_integer!(i8, Value::Int8);
impl_as_value_integer!(i16, Value::Int16);
impl_as_value_integer!(i32, Value::Int32);
impl_as_value_integer!(i64, Value::Int64);
impl_as_value_integer!(u8, Value::UInt8);
impl_as_value_integer!(u16, Value::UInt16);
impl_as_value_integer!(u32, Value::UInt32);
impl_as_value_integer!(u64, Value::UInt64);

macro_rules! impl_as_value_float {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            #[allow(unreachable_patterns)]
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v),
                    Value::Float32(Some(v)) => Ok(v as _),
                    Value::Float64(Some(v)) => Ok(v as _),
                    Value::Int8(Some(v)) => Ok(v as _),
                    Value::Int16(Some(v)) => Ok(v as _),
                    Value::Int32(Some(v)) => Ok(v as _),
                    Value::Int64(Some(v)) => Ok(v as _),
                    Value::UInt8(Some(v)) => Ok(v as _),
                    Value::UInt16(Some(v)) => Ok(v as _),
                    Value::UInt32(Some(v)) => Ok(v as _),
                    Value::UInt64(Some(v)) => Ok(v as _),
                    Value::Decimal(Some(v)) => v.to_f64().map(|v| v as _).ok_or_else(|| {
                        Error::msg(format!("Decimal {} does not fit in a float", v))
                    }),
                    Value::Varchar(Some(ref v)) => parse_text(v),
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
        }
    };
}

impl_as_value_float!(f32, Value::Float32);
impl_as_value_float!(f64, Value::Float64);

impl AsValue for bool {
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(Some(v)) => Ok(v),
            Value::Int8(Some(v)) => Ok(v != 0),
            Value::Int16(Some(v)) => Ok(v != 0),
            Value::Int32(Some(v)) => Ok(v != 0),
            Value::Int64(Some(v)) => Ok(v != 0),
            Value::UInt8(Some(v)) => Ok(v != 0),
            Value::UInt16(Some(v)) => Ok(v != 0),
            Value::UInt32(Some(v)) => Ok(v != 0),
            Value::UInt64(Some(v)) => Ok(v != 0),
            Value::Varchar(Some(ref v)) => match v.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Ok(true),
                "false" | "f" | "0" => Ok(false),
                _ => Err(mismatch::<Self>(&value)),
            },
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for Decimal {
    fn as_empty_value() -> Value {
        Value::Decimal(None)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(Some(v)) => Ok(v),
            Value::Int64(Some(v)) => Ok(Decimal::from(v)),
            Value::Int32(Some(v)) => Ok(Decimal::from(v)),
            Value::Float64(Some(v)) => Decimal::from_f64(v)
                .ok_or_else(|| Error::msg(format!("Float {} cannot be represented as Decimal", v))),
            Value::Varchar(Some(ref v)) => parse_text(v),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for String {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(Some(v)) => Ok(v),
            Value::Uuid(Some(v)) => Ok(v.hyphenated().to_string()),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for Cow<'static, str> {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self.into_owned()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        String::try_from_value(value).map(Cow::Owned)
    }
}

impl AsValue for Arc<str> {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self.as_ref().to_owned()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        String::try_from_value(value).map(Into::into)
    }
}

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into_boxed_slice()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v.into_vec()),
            Value::Varchar(Some(v)) => Ok(v.into_bytes()),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for Uuid {
    fn as_empty_value() -> Value {
        Value::Uuid(None)
    }
    fn as_value(self) -> Value {
        Value::Uuid(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Uuid(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) => parse_text(v),
            Value::Blob(Some(ref v)) => Uuid::from_slice(v).context("Blob is not a 16 bytes uuid"),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

/// Text form of a date, as stored by drivers without a native date type.
pub fn format_date(value: &Date) -> Result<String> {
    Ok(value.format(format_description!("[year]-[month]-[day]"))?)
}

/// Text form of a time, as stored by drivers without a native time type.
pub fn format_time(value: &Time) -> Result<String> {
    Ok(value.format(format_description!(
        "[hour]:[minute]:[second].[subsecond]"
    ))?)
}

/// Text form of a timestamp, as stored by drivers without a native timestamp type.
pub fn format_timestamp(value: &PrimitiveDateTime) -> Result<String> {
    Ok(value.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"
    ))?)
}

impl AsValue for Date {
    fn as_empty_value() -> Value {
        Value::Date(None)
    }
    fn as_value(self) -> Value {
        Value::Date(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.date()),
            Value::Varchar(Some(ref v)) => {
                Date::parse(v.trim(), format_description!("[year]-[month]-[day]"))
                    .with_context(|| format!("Cannot parse `{}` as a date", v))
            }
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for Time {
    fn as_empty_value() -> Value {
        Value::Time(None)
    }
    fn as_value(self) -> Value {
        Value::Time(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Time(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) => Time::parse(
                v.trim(),
                format_description!(
                    "[hour]:[minute]:[second][optional [.[subsecond]]]"
                ),
            )
            .with_context(|| format!("Cannot parse `{}` as a time", v)),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for PrimitiveDateTime {
    fn as_empty_value() -> Value {
        Value::Timestamp(None)
    }
    fn as_value(self) -> Value {
        Value::Timestamp(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) => PrimitiveDateTime::parse(
                &v.trim().replacen('T', " ", 1),
                format_description!(
                    "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"
                ),
            )
            .with_context(|| format!("Cannot parse `{}` as a timestamp", v)),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::try_from_value(value).map(Some)
    }
}

impl<T: AsValue> AsValue for Box<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        (*self).as_value()
    }
    fn try_from_value(value: Value) -> Result<Self> {
        T::try_from_value(value).map(Box::new)
    }
}
