//! Loose parameter values, path-parameter type coercion, and query assembly helpers.

// self
use crate::_prelude::*;

/// Loosely-specified request parameters accepted by normalization.
#[derive(Clone, Debug, PartialEq)]
pub enum Params {
	/// Preassembled query string, e.g. `a=1&b=2`.
	Raw(String),
	/// Key-value pairs, serialized in insertion order.
	Pairs(Vec<(String, String)>),
	/// Typed values run through the path-parameter coercion rules.
	Typed(BTreeMap<String, Json>),
}
impl Params {
	/// Returns true when no parameters are present.
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Raw(raw) => raw.is_empty(),
			Self::Pairs(pairs) => pairs.is_empty(),
			Self::Typed(map) => map.is_empty(),
		}
	}

	/// Removes the named parameter so it can fill a path placeholder.
	///
	/// Raw query strings are opaque here; placeholders never consume from them.
	pub(crate) fn take(&mut self, name: &str) -> Option<Json> {
		match self {
			Self::Raw(_) => None,
			Self::Pairs(pairs) => {
				let index = pairs.iter().position(|(key, _)| key == name)?;

				Some(Json::String(pairs.remove(index).1))
			},
			Self::Typed(map) => map.remove(name),
		}
	}

	/// Flattens the remaining parameters into query pairs.
	pub(crate) fn into_pairs(self) -> Vec<(String, String)> {
		match self {
			Self::Raw(raw) => parse_query(&raw),
			Self::Pairs(pairs) => pairs,
			Self::Typed(map) =>
				map.into_iter().map(|(key, value)| (key, coerce(&value, None))).collect(),
		}
	}
}
impl Default for Params {
	fn default() -> Self {
		Self::Pairs(Vec::new())
	}
}
impl From<&str> for Params {
	fn from(raw: &str) -> Self {
		Self::Raw(raw.to_owned())
	}
}
impl From<String> for Params {
	fn from(raw: String) -> Self {
		Self::Raw(raw)
	}
}
impl From<Vec<(String, String)>> for Params {
	fn from(pairs: Vec<(String, String)>) -> Self {
		Self::Pairs(pairs)
	}
}
impl From<BTreeMap<String, Json>> for Params {
	fn from(map: BTreeMap<String, Json>) -> Self {
		Self::Typed(map)
	}
}

/// Path-parameter kinds; each coerces a loose value to its canonical string form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
	/// Boolean, canonically `true`/`false`.
	Bool,
	/// Signed 8-bit integer.
	Int8,
	/// Signed 16-bit integer.
	Int16,
	/// Signed 32-bit integer.
	Int32,
	/// Signed 64-bit integer.
	Int64,
	/// Unsigned 8-bit integer.
	Uint8,
	/// Unsigned 16-bit integer.
	Uint16,
	/// Unsigned 32-bit integer.
	Uint32,
	/// Unsigned 64-bit integer.
	Uint64,
	/// Opaque string.
	String,
	/// Alphabetical token; passed through untouched.
	Alphabetical,
	/// Email address; passed through untouched.
	Email,
	/// UUID; passed through untouched.
	Uuid,
	/// Weekday token; passed through untouched.
	Weekday,
}
impl ParamKind {
	/// Resolves a placeholder tag such as `int8` or `uuid`.
	///
	/// Unknown tags fall back to [`ParamKind::String`] so a typo degrades to plain
	/// string coercion instead of failing the call.
	pub fn from_tag(tag: &str) -> Self {
		match tag.trim().trim_start_matches(':') {
			"bool" => Self::Bool,
			"int8" => Self::Int8,
			"int16" => Self::Int16,
			"int32" | "int" => Self::Int32,
			"int64" => Self::Int64,
			"uint8" => Self::Uint8,
			"uint16" => Self::Uint16,
			"uint32" | "uint" => Self::Uint32,
			"uint64" => Self::Uint64,
			"alphabetical" => Self::Alphabetical,
			"email" | "mail" => Self::Email,
			"uuid" => Self::Uuid,
			"weekday" => Self::Weekday,
			_ => Self::String,
		}
	}
}

/// Coerces a loose value to the canonical string form for the given kind.
///
/// Null and empty-string values always coerce to the empty string, regardless of kind.
/// Integer kinds saturate at their width bounds; unsigned kinds clamp negatives to zero.
pub fn coerce(value: &Json, kind: Option<ParamKind>) -> String {
	match value {
		Json::Null => return String::new(),
		Json::String(s) if s.is_empty() => return String::new(),
		_ => {},
	}

	let Some(kind) = kind else { return plain(value) };

	match kind {
		ParamKind::Bool => truthy(value).to_string(),
		ParamKind::Int8 => clamp_signed(value, i8::MIN as i64, i8::MAX as i64),
		ParamKind::Int16 => clamp_signed(value, i16::MIN as i64, i16::MAX as i64),
		ParamKind::Int32 => clamp_signed(value, i32::MIN as i64, i32::MAX as i64),
		ParamKind::Int64 => clamp_signed(value, i64::MIN, i64::MAX),
		ParamKind::Uint8 => clamp_unsigned(value, u8::MAX as u64),
		ParamKind::Uint16 => clamp_unsigned(value, u16::MAX as u64),
		ParamKind::Uint32 => clamp_unsigned(value, u32::MAX as u64),
		ParamKind::Uint64 => clamp_unsigned(value, u64::MAX),
		ParamKind::String
		| ParamKind::Alphabetical
		| ParamKind::Email
		| ParamKind::Uuid
		| ParamKind::Weekday => plain(value),
	}
}

fn plain(value: &Json) -> String {
	match value {
		Json::Null => String::new(),
		Json::Bool(b) => b.to_string(),
		Json::Number(n) => n.to_string(),
		Json::String(s) => s.clone(),
		other => other.to_string(),
	}
}

fn truthy(value: &Json) -> bool {
	match value {
		Json::Bool(b) => *b,
		Json::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
		Json::String(s) => matches!(s.as_str(), "true" | "1"),
		_ => false,
	}
}

fn as_i64(value: &Json) -> i64 {
	match value {
		Json::Bool(b) => i64::from(*b),
		Json::Number(n) =>
			n.as_i64().unwrap_or_else(|| n.as_f64().map(|f| f.trunc() as i64).unwrap_or(i64::MAX)),
		Json::String(s) =>
			s.parse::<i64>().unwrap_or_else(|_| s.parse::<f64>().map(|f| f.trunc() as i64).unwrap_or(0)),
		_ => 0,
	}
}

fn as_u64(value: &Json) -> u64 {
	match value {
		Json::Bool(b) => u64::from(*b),
		Json::Number(n) => n
			.as_u64()
			.unwrap_or_else(|| n.as_f64().map(|f| f.trunc().max(0.0) as u64).unwrap_or(0)),
		Json::String(s) => s
			.parse::<u64>()
			.unwrap_or_else(|_| s.parse::<f64>().map(|f| f.trunc().max(0.0) as u64).unwrap_or(0)),
		_ => 0,
	}
}

fn clamp_signed(value: &Json, min: i64, max: i64) -> String {
	as_i64(value).clamp(min, max).to_string()
}

fn clamp_unsigned(value: &Json, max: u64) -> String {
	as_u64(value).min(max).to_string()
}

/// Decodes a raw query string into owned key-value pairs.
pub(crate) fn parse_query(raw: &str) -> Vec<(String, String)> {
	url::form_urlencoded::parse(raw.trim_start_matches('?').as_bytes()).into_owned().collect()
}

/// Merges `extra` into `base`; on key collision the value from `extra` overwrites.
pub(crate) fn merge_pairs(
	base: Vec<(String, String)>,
	extra: Vec<(String, String)>,
) -> Vec<(String, String)> {
	let mut merged = base;

	for (key, value) in extra {
		match merged.iter_mut().find(|(name, _)| *name == key) {
			Some(slot) => slot.1 = value,
			None => merged.push((key, value)),
		}
	}

	merged
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn null_and_empty_always_coerce_to_empty() {
		for kind in [None, Some(ParamKind::Bool), Some(ParamKind::Uint64), Some(ParamKind::Uuid)] {
			assert_eq!(coerce(&Json::Null, kind), "");
			assert_eq!(coerce(&json!(""), kind), "");
		}
	}

	#[test]
	fn bool_coercion_is_canonical() {
		assert_eq!(coerce(&json!(true), Some(ParamKind::Bool)), "true");
		assert_eq!(coerce(&json!(0), Some(ParamKind::Bool)), "false");
		assert_eq!(coerce(&json!("1"), Some(ParamKind::Bool)), "true");
		assert_eq!(coerce(&json!("nope"), Some(ParamKind::Bool)), "false");
	}

	#[test]
	fn integer_kinds_saturate_at_their_width() {
		assert_eq!(coerce(&json!(300), Some(ParamKind::Int8)), "127");
		assert_eq!(coerce(&json!(-300), Some(ParamKind::Int8)), "-128");
		assert_eq!(coerce(&json!(-7), Some(ParamKind::Uint16)), "0");
		assert_eq!(coerce(&json!(70_000), Some(ParamKind::Uint16)), "65535");
		assert_eq!(coerce(&json!("42"), Some(ParamKind::Uint64)), "42");
	}

	#[test]
	fn string_like_kinds_pass_through() {
		let uuid = "f3b9a9a4-9f44-4b0e-9a6f-0f6e2c8a3f21";

		assert_eq!(coerce(&json!(uuid), Some(ParamKind::Uuid)), uuid);
		assert_eq!(coerce(&json!("a@b.c"), Some(ParamKind::Email)), "a@b.c");
	}

	#[test]
	fn unknown_tags_fall_back_to_string() {
		assert_eq!(ParamKind::from_tag(":whatever"), ParamKind::String);
		assert_eq!(ParamKind::from_tag("uint"), ParamKind::Uint32);
		assert_eq!(ParamKind::from_tag(":int"), ParamKind::Int32);
	}

	#[test]
	fn merge_pairs_overwrites_on_collision() {
		let merged = merge_pairs(
			vec![("q".into(), "1".into()), ("page".into(), "2".into())],
			vec![("q".into(), "9".into()), ("sort".into(), "asc".into())],
		);

		assert_eq!(merged, vec![
			("q".to_owned(), "9".to_owned()),
			("page".to_owned(), "2".to_owned()),
			("sort".to_owned(), "asc".to_owned()),
		]);
	}
}
