use lge_render::DrawBackend;
use lge_scene::{DEFAULT_AMBIENT, DEFAULT_DIFFUSE, HandleKind, InstanceId, ModelId, Placement, SceneError};
use serde_json::{Value, json};

use crate::engine::Engine;
use crate::error::EngineError;
use crate::{DEFAULT_CLEAR_COLOR, DEFAULT_DRAW_COLOR};

/// Positional arguments of one native call. Indices in errors are 1-based,
/// as scripts count them.
struct Args<'a> {
    function: &'a str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    fn bad(&self, i: usize, expected: &'static str) -> EngineError {
        EngineError::BadArgument {
            function: self.function.to_string(),
            index: i + 1,
            expected,
        }
    }

    fn present(&self, i: usize) -> Option<&'a Value> {
        self.values.get(i).filter(|v| !v.is_null())
    }

    fn number(&self, i: usize) -> Result<f32, EngineError> {
        self.present(i)
            .and_then(coerce_number)
            .ok_or_else(|| self.bad(i, "a number"))
    }

    fn number_or(&self, i: usize, default: f32) -> Result<f32, EngineError> {
        match self.present(i) {
            None => Ok(default),
            Some(v) => coerce_number(v).ok_or_else(|| self.bad(i, "a number")),
        }
    }

    fn int(&self, i: usize) -> Result<i32, EngineError> {
        Ok(self.integer(i)?.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
    }

    fn integer(&self, i: usize) -> Result<i64, EngineError> {
        self.present(i)
            .and_then(coerce_integer)
            .ok_or_else(|| self.bad(i, "an integer"))
    }

    fn str(&self, i: usize) -> Result<&'a str, EngineError> {
        self.present(i)
            .and_then(Value::as_str)
            .ok_or_else(|| self.bad(i, "a string"))
    }

    fn str_or(&self, i: usize, default: &'static str) -> Result<&'a str, EngineError> {
        match self.present(i) {
            None => Ok(default),
            Some(v) => v.as_str().ok_or_else(|| self.bad(i, "a string")),
        }
    }

    fn array(&self, i: usize, expected: &'static str) -> Result<&'a [Value], EngineError> {
        self.present(i)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .ok_or_else(|| self.bad(i, expected))
    }

    fn numbers(&self, i: usize) -> Result<Vec<f32>, EngineError> {
        self.array(i, "an array of numbers")?
            .iter()
            .map(|v| coerce_number(v).ok_or_else(|| self.bad(i, "an array of numbers")))
            .collect()
    }

    fn integers(&self, i: usize) -> Result<Vec<i64>, EngineError> {
        self.array(i, "an array of integers")?
            .iter()
            .map(|v| coerce_integer(v).ok_or_else(|| self.bad(i, "an array of integers")))
            .collect()
    }

    fn strings(&self, i: usize) -> Result<Vec<&'a str>, EngineError> {
        self.array(i, "an array of strings")?
            .iter()
            .map(|v| v.as_str().ok_or_else(|| self.bad(i, "an array of strings")))
            .collect()
    }
}

fn coerce_number(v: &Value) -> Option<f32> {
    match v {
        Value::Number(n) => n.as_f64().map(|f| f as f32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Integers also accept whole floats and numeric strings; fractions truncate.
fn coerce_integer(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}

impl<B: DrawBackend> Engine<B> {
    /// Call a boundary function by name with JSON arguments, the way a
    /// scripting host forwards native calls. Optional trailing arguments
    /// may be omitted or `null`.
    pub fn invoke(&mut self, name: &str, args: &[Value]) -> Result<Value, EngineError> {
        let a = Args {
            function: name,
            values: args,
        };
        tracing::trace!(function = name, argc = args.len(), "invoke");
        match name {
            "set_3d_camera" => {
                self.set_3d_camera(a.number(0)?, a.number(1)?);
                Ok(Value::Null)
            }
            "set_3d_light" => {
                self.set_3d_light(
                    a.number(0)?,
                    a.number(1)?,
                    a.number(2)?,
                    a.number_or(3, DEFAULT_AMBIENT)?,
                    a.number_or(4, DEFAULT_DIFFUSE)?,
                );
                Ok(Value::Null)
            }
            "create_3d_model" => {
                let id = self.create_3d_model(a.numbers(0)?, &a.integers(1)?);
                Ok(json!(id.0))
            }
            "create_3d_instance" => {
                let raw = a.integer(0)?;
                let model = u32::try_from(raw).map(ModelId).map_err(|_| {
                    SceneError::InvalidHandle {
                        kind: HandleKind::Model,
                        id: raw,
                    }
                })?;
                let colors = a.strings(1)?;
                let id = self.create_3d_instance(model, colors.as_slice())?;
                Ok(json!(id.0))
            }
            "draw_3d_instance" => {
                let id = InstanceId(u32::try_from(a.integer(0)?).unwrap_or(0));
                let placement = Placement::new(
                    a.number(1)?,
                    a.number(2)?,
                    a.number(3)?,
                    a.number(4)?,
                    a.number(5)?,
                    a.number(6)?,
                    a.number(7)?,
                );
                self.draw_3d_instance(id, &placement);
                Ok(Value::Null)
            }
            "clear_canvas" => {
                self.clear_canvas(a.str_or(0, DEFAULT_CLEAR_COLOR)?);
                Ok(Value::Null)
            }
            "draw_circle" => {
                self.draw_circle(a.int(0)?, a.int(1)?, a.int(2)?, a.str_or(3, DEFAULT_DRAW_COLOR)?);
                Ok(Value::Null)
            }
            "draw_rect" => {
                self.draw_rect(
                    a.int(0)?,
                    a.int(1)?,
                    a.int(2)?,
                    a.int(3)?,
                    a.str_or(4, DEFAULT_DRAW_COLOR)?,
                );
                Ok(Value::Null)
            }
            "draw_triangle" => {
                self.draw_triangle(
                    a.int(0)?,
                    a.int(1)?,
                    a.int(2)?,
                    a.int(3)?,
                    a.int(4)?,
                    a.int(5)?,
                    a.str_or(6, DEFAULT_DRAW_COLOR)?,
                );
                Ok(Value::Null)
            }
            "draw_text" => {
                self.draw_text(a.int(0)?, a.int(1)?, a.str(2)?, a.str_or(3, DEFAULT_DRAW_COLOR)?);
                Ok(Value::Null)
            }
            "delay" => {
                self.delay(a.integer(0)?);
                Ok(Value::Null)
            }
            "get_canvas_size" => {
                let (w, h) = self.get_canvas_size();
                Ok(json!([w, h]))
            }
            "present" => {
                let report = self.present();
                Ok(json!({ "rects": report.rects.len(), "pixels": report.pixels }))
            }
            "fps" => Ok(json!(self.fps())),
            _ => Err(EngineError::UnknownFunction(name.to_string())),
        }
    }
}
