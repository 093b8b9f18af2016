//! Per-kind coercion of raw values into domain values
//!
//! Every converter maps null to null. Date-like converters also treat the
//! empty string as null, since forms submit blank inputs that way.

use super::FieldKind;
use crate::error::{ResourceError, Result};
use crate::value::Value;
use bson::oid::ObjectId;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use std::str::FromStr;

static DATE_REGEX: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"^(?P<year>\d{4})-(?P<month>\d{2})-(?P<day>\d{2})(?:(?:T|\s+).*)?$")
		.expect("DATE_REGEX: invalid regex pattern")
});

static DATETIME_REGEX: Lazy<Regex> = Lazy::new(|| {
	Regex::new(
		r"^(?P<year>\d{4})-(?P<month>\d{2})-(?P<day>\d{2})(?:T|\s+)(?P<hour>\d{2}):(?P<minute>\d{2}):(?P<second>\d{2})(?:\.(?P<fraction>\d{1,9}))?$",
	)
	.expect("DATETIME_REGEX: invalid regex pattern")
});

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

pub(super) fn convert(field: &str, kind: &FieldKind, value: &Value) -> Result<Value> {
	if value.is_null() {
		return Ok(Value::Null);
	}
	match kind {
		FieldKind::String | FieldKind::ResourceUri => Ok(to_string(value)),
		FieldKind::Integer => to_integer(field, value),
		FieldKind::Float => to_float(field, value),
		FieldKind::Decimal => to_decimal(field, value),
		FieldKind::Boolean => to_boolean(field, value),
		FieldKind::List => match value {
			Value::List(_) => Ok(value.clone()),
			other => Err(mismatch(field, other, "a list")),
		},
		FieldKind::Dict => match value {
			Value::Dict(_) => Ok(value.clone()),
			other => Err(mismatch(field, other, "a mapping")),
		},
		FieldKind::Date => to_date(field, value),
		FieldKind::DateTime => to_datetime(field, value),
		FieldKind::Time => to_time(field, value),
		FieldKind::ObjectId => to_object_id(field, value),
		FieldKind::Embedded(schema) => schema.convert(field, value),
		FieldKind::Related(_) => Ok(value.clone()),
	}
}

fn mismatch(field: &str, value: &Value, expected: &str) -> ResourceError {
	ResourceError::conversion(
		field,
		value,
		format!("expected {}, got {}", expected, value.type_name()),
	)
}

/// Anything non-null has a string form; lists and mappings use their JSON text
fn to_string(value: &Value) -> Value {
	match value.to_json() {
		serde_json::Value::String(s) => Value::String(s),
		other => Value::String(other.to_string()),
	}
}

fn to_integer(field: &str, value: &Value) -> Result<Value> {
	match value {
		Value::Int(_) => Ok(value.clone()),
		Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
		Value::Float(f) if f.is_finite() => {
			let whole = f.trunc();
			if whole < i64::MIN as f64 || whole >= i64::MAX as f64 {
				return Err(ResourceError::conversion(field, value, "out of integer range"));
			}
			Ok(Value::Int(whole as i64))
		}
		Value::Decimal(d) => d
			.trunc()
			.to_i64()
			.map(Value::Int)
			.ok_or_else(|| ResourceError::conversion(field, value, "out of integer range")),
		Value::String(s) => s
			.trim()
			.parse::<i64>()
			.map(Value::Int)
			.map_err(|e| ResourceError::conversion(field, value, e.to_string())),
		other => Err(mismatch(field, other, "an integer")),
	}
}

fn to_float(field: &str, value: &Value) -> Result<Value> {
	match value {
		Value::Float(_) => Ok(value.clone()),
		Value::Int(i) => Ok(Value::Float(*i as f64)),
		Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
		Value::Decimal(d) => d
			.to_f64()
			.map(Value::Float)
			.ok_or_else(|| ResourceError::conversion(field, value, "out of float range")),
		Value::String(s) => s
			.trim()
			.parse::<f64>()
			.map(Value::Float)
			.map_err(|e| ResourceError::conversion(field, value, e.to_string())),
		other => Err(mismatch(field, other, "a float")),
	}
}

fn to_decimal(field: &str, value: &Value) -> Result<Value> {
	match value {
		Value::Decimal(_) => Ok(value.clone()),
		Value::Int(i) => Ok(Value::Decimal(Decimal::from(*i))),
		Value::Float(f) => Decimal::from_f64(*f)
			.map(Value::Decimal)
			.ok_or_else(|| ResourceError::conversion(field, value, "not representable as decimal")),
		Value::String(s) => Decimal::from_str(s.trim())
			.or_else(|_| Decimal::from_scientific(s.trim()))
			.map(Value::Decimal)
			.map_err(|e| ResourceError::conversion(field, value, e.to_string())),
		other => Err(mismatch(field, other, "a decimal")),
	}
}

fn to_boolean(field: &str, value: &Value) -> Result<Value> {
	match value {
		Value::Bool(_) => Ok(value.clone()),
		Value::Int(i) => Ok(Value::Bool(*i != 0)),
		Value::Float(f) => Ok(Value::Bool(*f != 0.0)),
		Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
			"true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
			"false" | "0" | "no" | "off" | "" => Ok(Value::Bool(false)),
			_ => Err(ResourceError::conversion(field, value, "not a boolean literal")),
		},
		other => Err(mismatch(field, other, "a boolean")),
	}
}

fn capture<T: FromStr>(caps: &regex::Captures<'_>, name: &str) -> Option<T> {
	caps.name(name).and_then(|m| m.as_str().parse().ok())
}

fn to_date(field: &str, value: &Value) -> Result<Value> {
	match value {
		Value::Date(_) => Ok(value.clone()),
		Value::DateTime(dt) => Ok(Value::Date(dt.date_naive())),
		Value::String(s) if s.is_empty() => Ok(Value::Null),
		Value::String(s) => {
			let caps = DATE_REGEX
				.captures(s.trim())
				.ok_or_else(|| ResourceError::conversion(field, value, "not a YYYY-MM-DD date"))?;
			// a trailing time of day is discarded
			let date = match (
				capture(&caps, "year"),
				capture(&caps, "month"),
				capture(&caps, "day"),
			) {
				(Some(y), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y, m, d),
				_ => None,
			};
			date.map(Value::Date)
				.ok_or_else(|| ResourceError::conversion(field, value, "no such calendar date"))
		}
		other => Err(mismatch(field, other, "a date")),
	}
}

fn to_datetime(field: &str, value: &Value) -> Result<Value> {
	match value {
		Value::DateTime(_) => Ok(value.clone()),
		Value::Date(d) => Ok(Value::DateTime(d.and_time(NaiveTime::MIN).and_utc())),
		Value::String(s) if s.is_empty() => Ok(Value::Null),
		Value::String(s) => {
			let s = s.trim();
			if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
				return Ok(Value::DateTime(dt.with_timezone(&Utc)));
			}
			if let Some(naive) = parse_naive_datetime(s) {
				return Ok(Value::DateTime(naive.and_utc()));
			}
			// a bare date means midnight
			let bare_date = if s.len() == 10 {
				to_date(field, value).ok()
			} else {
				None
			};
			match bare_date {
				Some(Value::Date(d)) => Ok(Value::DateTime(d.and_time(NaiveTime::MIN).and_utc())),
				_ => Err(ResourceError::conversion(
					field,
					value,
					"not a YYYY-MM-DD[T| ]HH:MM:SS datetime",
				)),
			}
		}
		other => Err(mismatch(field, other, "a datetime")),
	}
}

/// Datetimes without an offset are taken to be UTC
fn parse_naive_datetime(s: &str) -> Option<NaiveDateTime> {
	let caps = DATETIME_REGEX.captures(s)?;
	let date = NaiveDate::from_ymd_opt(
		capture(&caps, "year")?,
		capture(&caps, "month")?,
		capture(&caps, "day")?,
	)?;
	let nanos = match caps.name("fraction") {
		Some(m) => {
			let digits = m.as_str();
			let scale = 10u32.pow(9 - digits.len() as u32);
			digits.parse::<u32>().ok()? * scale
		}
		None => 0,
	};
	let time = NaiveTime::from_hms_nano_opt(
		capture(&caps, "hour")?,
		capture(&caps, "minute")?,
		capture(&caps, "second")?,
		nanos,
	)?;
	Some(date.and_time(time))
}

fn to_time(field: &str, value: &Value) -> Result<Value> {
	match value {
		Value::Time(_) => Ok(value.clone()),
		Value::DateTime(dt) => Ok(Value::Time(dt.time())),
		Value::String(s) if s.is_empty() => Ok(Value::Null),
		Value::String(s) => TIME_FORMATS
			.iter()
			.find_map(|fmt| NaiveTime::parse_from_str(s.trim(), fmt).ok())
			.map(Value::Time)
			.ok_or_else(|| ResourceError::conversion(field, value, "not a time of day")),
		other => Err(mismatch(field, other, "a time")),
	}
}

fn to_object_id(field: &str, value: &Value) -> Result<Value> {
	match value {
		Value::ObjectId(_) => Ok(value.clone()),
		Value::Reference(r) => Ok(r.id().map(Value::ObjectId).unwrap_or_default()),
		Value::String(s) => ObjectId::parse_str(s.trim())
			.map(Value::ObjectId)
			.map_err(|e| ResourceError::conversion(field, value, e.to_string())),
		other => Err(mismatch(field, other, "an object id")),
	}
}
