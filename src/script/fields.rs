//! Typed field access over a parsed JSON value, with field paths in errors.

use serde_json::{Map, Value};

use crate::error::{SceneError, SceneResult};
use crate::script::document::Vec2;

/// A JSON object paired with the path it was reached by.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Fields<'a> {
    path: &'a str,
    object: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub(crate) fn of(value: &'a Value, path: &'a str) -> SceneResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| SceneError::validation(path, "expected object"))?;
        Ok(Self { path, object })
    }

    pub(crate) fn object(&self) -> &'a Map<String, Value> {
        self.object
    }

    pub(crate) fn path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<&'a Value> {
        self.object.get(key)
    }

    pub(crate) fn require(&self, key: &str) -> SceneResult<&'a Value> {
        self.get(key)
            .ok_or_else(|| SceneError::validation(self.path(key), "missing required field"))
    }

    pub(crate) fn require_str(&self, key: &str) -> SceneResult<&'a str> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| SceneError::validation(self.path(key), "expected string"))
    }

    pub(crate) fn optional_str(&self, key: &str) -> SceneResult<Option<&'a str>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| SceneError::validation(self.path(key), "expected string")),
        }
    }

    pub(crate) fn optional_bool(&self, key: &str) -> SceneResult<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_bool()
                .map(Some)
                .ok_or_else(|| SceneError::validation(self.path(key), "expected boolean")),
        }
    }

    /// Reads a `[x, y]` pair of numbers.
    pub(crate) fn optional_vec2(&self, key: &str) -> SceneResult<Option<Vec2>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let field = self.path(key);
        let [x, y] = pair(value, &field)?;
        let x = narrow_f32(x, &format!("{field}[0]"))?;
        let y = narrow_f32(y, &format!("{field}[1]"))?;
        Ok(Some(Vec2::new(x, y)))
    }

    /// Reads a number that must stay finite once narrowed to `f32`.
    pub(crate) fn require_f32(&self, key: &str) -> SceneResult<f32> {
        narrow_f32(self.require(key)?, &self.path(key))
    }

    /// Reads a `[a, b]` pair of whole numbers no smaller than `min`.
    pub(crate) fn optional_uint_pair(&self, key: &str, min: u32) -> SceneResult<Option<(u32, u32)>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let field = self.path(key);
        let [a, b] = pair(value, &field)?;
        let a = whole_number(a, min, &format!("{field}[0]"))?;
        let b = whole_number(b, min, &format!("{field}[1]"))?;
        Ok(Some((a, b)))
    }
}

fn pair<'v>(value: &'v Value, field: &str) -> SceneResult<[&'v Value; 2]> {
    match value.as_array().map(Vec::as_slice) {
        Some([a, b]) => Ok([a, b]),
        Some(_) => Err(SceneError::validation(field, "expected array of two elements")),
        None => Err(SceneError::validation(field, "expected array")),
    }
}

fn narrow_f32(value: &Value, field: &str) -> SceneResult<f32> {
    let number = value
        .as_f64()
        .ok_or_else(|| SceneError::validation(field, "expected number"))?;
    let narrowed = number as f32;
    if !narrowed.is_finite() {
        return Err(SceneError::validation(field, "number out of range"));
    }
    Ok(narrowed)
}

fn whole_number(value: &Value, min: u32, field: &str) -> SceneResult<u32> {
    let number = value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|n| n.is_finite() && n.fract() == 0.0 && *n >= 0.0 && *n <= u32::MAX as f64)
            .map(|n| n as u64)
    });
    match number.and_then(|n| u32::try_from(n).ok()) {
        Some(n) if n >= min => Ok(n),
        _ if min > 0 => Err(SceneError::validation(field, "expected positive integer")),
        _ => Err(SceneError::validation(field, "expected non-negative integer")),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn uint_pair_accepts_integral_floats() {
        let value = json!({ "sheetSize": [3.0, 2] });
        let fields = Fields::of(&value, "actors.a").unwrap();
        assert_eq!(fields.optional_uint_pair("sheetSize", 1).unwrap(), Some((3, 2)));
    }

    #[test]
    fn uint_pair_rejects_zero_when_positive_required() {
        let value = json!({ "sheetSize": [0, 2] });
        let fields = Fields::of(&value, "actors.a").unwrap();
        let err = fields.optional_uint_pair("sheetSize", 1).unwrap_err();
        assert_eq!(err.field(), Some("actors.a.sheetSize[0]"));
    }

    #[test]
    fn uint_pair_rejects_wrong_arity() {
        let value = json!({ "portrait": [1, 2, 3] });
        let fields = Fields::of(&value, "commands[0].speak").unwrap();
        let err = fields.optional_uint_pair("portrait", 0).unwrap_err();
        assert_eq!(err.field(), Some("commands[0].speak.portrait"));
    }

    #[test]
    fn numbers_beyond_f32_range_are_rejected() {
        let value = json!({ "pos": [1e40, 0], "time": 1e300, "size": [0.5, 2] });
        let fields = Fields::of(&value, "commands[0].sprite").unwrap();
        let err = fields.optional_vec2("pos").unwrap_err();
        assert_eq!(err.field(), Some("commands[0].sprite.pos[0]"));
        let err = fields.require_f32("time").unwrap_err();
        assert_eq!(err.field(), Some("commands[0].sprite.time"));
        assert_eq!(fields.optional_vec2("size").unwrap(), Some(Vec2::new(0.5, 2.0)));
    }

    #[test]
    fn missing_required_string_names_the_path() {
        let value = json!({});
        let fields = Fields::of(&value, "actors.bob").unwrap();
        let err = fields.require_str("name").unwrap_err();
        assert_eq!(err.field(), Some("actors.bob.name"));
    }
}
