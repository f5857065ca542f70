// src/engine_lib/params.rs

use std::fmt;

use crate::rendering_lib::effects::srgb_to_linear;

/// Value of a tunable parameter.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Bool(bool),
    /// Linear RGB in [0, 1].
    Color([f32; 3]),
}

impl ParamValue {
    fn kind(&self) -> &'static str {
        match self {
            ParamValue::Float(_) => "float",
            ParamValue::Bool(_) => "bool",
            ParamValue::Color(_) => "color",
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            ParamValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<[f32; 3]> {
        match self {
            ParamValue::Color(v) => Some(*v),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl ParamRange {
    pub const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub label: String,
    pub value: ParamValue,
    pub range: Option<ParamRange>,
}

/// A change waiting to be applied by the render thread.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamChange {
    pub name: String,
    pub value: ParamValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    Unknown(String),
    TypeMismatch { name: String, expected: &'static str, found: &'static str },
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::Unknown(name) => write!(f, "unknown parameter '{name}'"),
            ParamError::TypeMismatch { name, expected, found } => {
                write!(f, "parameter '{name}' holds a {expected}, got a {found}")
            }
        }
    }
}

impl std::error::Error for ParamError {}

/// Named tunables shared between the parameter panel and the render loop.
///
/// The panel writes through [`ParameterSet::set`]; every accepted write is
/// queued and the render loop drains the queue once per tick with
/// [`ParameterSet::take_changes`], so writes are only observed at frame
/// boundaries.
#[derive(Debug, Clone, Default)]
pub struct ParameterSet {
    params: Vec<Param>,
    pending: Vec<ParamChange>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a parameter. Registering an existing name replaces it.
    pub fn register(&mut self, name: &str, label: &str, value: ParamValue, range: Option<ParamRange>) {
        let value = match (value, range) {
            (ParamValue::Float(v), Some(r)) => ParamValue::Float(r.clamp(v)),
            (other, _) => other,
        };
        let param = Param {
            name: name.to_string(),
            label: label.to_string(),
            value,
            range,
        };
        match self.params.iter_mut().find(|p| p.name == name) {
            Some(existing) => *existing = param,
            None => self.params.push(param),
        }
    }

    pub fn float(mut self, name: &str, label: &str, value: f32, range: ParamRange) -> Self {
        self.register(name, label, ParamValue::Float(value), Some(range));
        self
    }

    pub fn toggle(mut self, name: &str, label: &str, value: bool) -> Self {
        self.register(name, label, ParamValue::Bool(value), None);
        self
    }

    pub fn color(mut self, name: &str, label: &str, value: [f32; 3]) -> Self {
        self.register(name, label, ParamValue::Color(value), None);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.params.iter()
    }

    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.params.iter().find(|p| p.name == name).map(|p| p.value)
    }

    pub fn range(&self, name: &str) -> Option<ParamRange> {
        self.params.iter().find(|p| p.name == name).and_then(|p| p.range)
    }

    /// Stores `value` (clamped to the parameter range) and queues a change
    /// notification. Returns the value actually stored.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<ParamValue, ParamError> {
        let param = self
            .params
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| ParamError::Unknown(name.to_string()))?;

        let stored = match (param.value, value) {
            (ParamValue::Float(_), ParamValue::Float(v)) => {
                ParamValue::Float(param.range.map_or(v, |r| r.clamp(v)))
            }
            (ParamValue::Bool(_), ParamValue::Bool(v)) => ParamValue::Bool(v),
            (ParamValue::Color(_), ParamValue::Color(c)) => {
                ParamValue::Color(c.map(|ch| ch.clamp(0.0, 1.0)))
            }
            (current, new) => {
                return Err(ParamError::TypeMismatch {
                    name: name.to_string(),
                    expected: current.kind(),
                    found: new.kind(),
                })
            }
        };

        if stored != param.value {
            param.value = stored;
            self.pending.push(ParamChange {
                name: name.to_string(),
                value: stored,
            });
        }
        Ok(stored)
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drains queued changes in write order.
    pub fn take_changes(&mut self) -> Vec<ParamChange> {
        std::mem::take(&mut self.pending)
    }
}

/// Parses an sRGB `#rrggbb` string into linear RGB in [0, 1].
pub fn color_from_hex(hex: &str) -> Option<[f32; 3]> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16)
            .ok()
            .map(|v| srgb_to_linear(v as f32 / 255.0));
    Some([channel(0)?, channel(2)?, channel(4)?])
}
