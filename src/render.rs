use std::collections::HashMap;

use serde_json::{Map, Value};
use tera::{Context, Tera};

use crate::error::Result;

pub type RenderContext = Map<String, Value>;

const BUNDLED: &[(&str, &str)] = &[
    ("base/layout.html", include_str!("../templates/base/layout.html")),
    ("base/index.html", include_str!("../templates/base/index.html")),
    ("base/fastqc.html", include_str!("../templates/base/fastqc.html")),
    ("rna_seq/layout.html", include_str!("../templates/rna_seq/layout.html")),
    ("rna_seq/index.html", include_str!("../templates/rna_seq/index.html")),
    ("rna_seq/star.html", include_str!("../templates/rna_seq/star.html")),
    ("rna_seq/cufflinks.html", include_str!("../templates/rna_seq/cufflinks.html")),
    ("rna_seq/cuffdiff.html", include_str!("../templates/rna_seq/cuffdiff.html")),
];

pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn bundled() -> Result<Self> {
        Self::from_raw(BUNDLED)
    }

    pub fn from_raw(templates: &[(&str, &str)]) -> Result<Self> {
        let mut tera = Tera::default();
        tera.register_filter("script_json", script_json);
        tera.add_raw_templates(templates.iter().copied())?;
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, context: &RenderContext) -> Result<String> {
        let context = Context::from_value(Value::Object(context.clone()))?;
        Ok(self.tera.render(name, &context)?)
    }
}

// JSON for an inline `<script>` block; `</` is escaped so a value cannot
// close the element.
fn script_json(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let encoded = serde_json::to_string(value).map_err(tera::Error::json)?;
    Ok(Value::String(encoded.replace("</", "<\\/")))
}

#[cfg(test)]
#[path = "../tests/src_inline/render.rs"]
mod tests;
