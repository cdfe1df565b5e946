//! Clean XML export.
//!
//! Model-building tools that assemble MJCF programmatically tend to leave
//! noise in their output: a `<default>` wrapper around the global default
//! class, content hashes appended to asset file names, explicit
//! `class="/"` and `gravcomp="0"` attributes, and no visual separation
//! between top-level sections.  [`to_clean_xml`] writes a tree without any
//! of that.
//!
//! # Example
//!
//! ```rust
//! use mjutils_mjcf::{parse_str, to_clean_xml, ExportOptions};
//!
//! let model = parse_str(r#"<mujoco model="m"><worldbody><body name="b" gravcomp="0" pos="0 0 0.10000001"/></worldbody></mujoco>"#).unwrap();
//! let xml = to_clean_xml(&model, &ExportOptions::default()).unwrap();
//! assert_eq!(xml, "<mujoco model=\"m\">\n  <worldbody>\n    <body name=\"b\" pos=\"0 0 0.1\"/>\n  </worldbody>\n\n</mujoco>\n");
//! ```

use std::path::Path;

use mjutils_types::MjError;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::element::{AttrValue, Element};

/// Length of the `-<sha1 hex>` suffix appended to asset file stems.
const HASH_SUFFIX_LEN: usize = 41;

/// Asset elements whose `file` attribute may carry a content hash.
const HASHED_ASSETS: &[&str] = &["mesh", "skin"];

/// Number formatting for [`to_clean_xml`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Significant digits for floating point quantities.
    pub precision: usize,
    /// Quantities whose magnitude falls below this are written as `0`.
    pub zero_threshold: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            precision: 5,
            zero_threshold: 1e-7,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Public API
// ────────────────────────────────────────────────────────────────────────────

/// Serialize `root` to a cleaned-up MJCF string.
///
/// The input tree is left untouched; cleanup runs on a copy.
pub fn to_clean_xml(root: &Element, options: &ExportOptions) -> Result<String, MjError> {
    let mut tree = root.clone();
    unwrap_global_default(&mut tree);
    strip_asset_hashes(&mut tree);
    strip_redundant_attributes(&mut tree, options);

    let raw = serialize(&tree, options)?;
    Ok(space_top_level(&raw))
}

/// Write the output of [`to_clean_xml`] to `path`.
pub fn write_clean_xml(
    root: &Element,
    path: impl AsRef<Path>,
    options: &ExportOptions,
) -> Result<(), MjError> {
    let path = path.as_ref();
    let xml = to_clean_xml(root, options)?;
    std::fs::write(path, xml.as_bytes()).map_err(|e| MjError::io(path, e))?;
    debug!(path = %path.display(), bytes = xml.len(), "wrote clean MJCF");
    Ok(())
}

/// Format a single number the way `%.{precision}g` does, flushing tiny
/// magnitudes to zero.
pub fn format_number(value: f64, options: &ExportOptions) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value.abs() < options.zero_threshold {
        return "0".to_string();
    }
    let precision = options.precision.max(1);
    let sci = format!("{:.*e}", precision - 1, value);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    if exp < -4 || exp >= precision as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exp.abs())
    } else {
        let decimals = (precision as i32 - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Cleanup passes
// ────────────────────────────────────────────────────────────────────────────

/// Replace `<default><default class="/">…</default></default>` by the inner
/// element, at the wrapper's position.
fn unwrap_global_default(root: &mut Element) {
    let Some(idx) = root.children.iter().position(|c| c.tag == "default") else {
        return;
    };
    let wrapper = &root.children[idx];
    let is_wrapper = wrapper.attributes().is_empty()
        && wrapper.children.len() == 1
        && wrapper.children[0].tag == "default"
        && wrapper.children[0].text_attr("class") == Some("/");
    if !is_wrapper {
        debug!("top-level <default> is not a global-class wrapper; left as is");
        return;
    }
    let wrapper = root.children.remove(idx);
    if let Some(inner) = wrapper.children.into_iter().next() {
        root.children.insert(idx, inner);
    }
}

/// Turn `name-<40 hex>.ext` into `name.ext` for hashed asset files.
fn strip_asset_hashes(root: &mut Element) {
    let mut stripped = 0usize;
    for asset in root.children.iter_mut().filter(|c| c.tag == "asset") {
        stripped += strip_hashes_below(asset);
    }
    if stripped > 0 {
        debug!(count = stripped, "removed content hashes from asset file names");
    }
}

fn strip_hashes_below(element: &mut Element) -> usize {
    let mut stripped = 0;
    if HASHED_ASSETS.contains(&element.tag.as_str())
        && let Some(clean) = element.text_attr("file").and_then(unhashed_file_name)
    {
        element.set_text("file", clean);
        stripped += 1;
    }
    for child in &mut element.children {
        stripped += strip_hashes_below(child);
    }
    stripped
}

fn unhashed_file_name(file: &str) -> Option<String> {
    let (stem, ext) = file.rsplit_once('.')?;
    let cut = stem.len().checked_sub(HASH_SUFFIX_LEN)?;
    if !stem.is_char_boundary(cut) {
        return None;
    }
    let (base, suffix) = stem.split_at(cut);
    let hex = suffix.strip_prefix('-')?;
    if base.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("{base}.{ext}"))
}

/// Drop `class="/"` and attributes equal to `gravcomp="0"` once formatted.
fn strip_redundant_attributes(element: &mut Element, options: &ExportOptions) {
    element.retain_attrs(|key, value| match key {
        "class" => !matches!(value, AttrValue::Text(s) if s == "/"),
        "gravcomp" => render_value(value, options) != "0",
        _ => true,
    });
    for child in &mut element.children {
        strip_redundant_attributes(child, options);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Serialization
// ────────────────────────────────────────────────────────────────────────────

fn serialize(root: &Element, options: &ExportOptions) -> Result<String, MjError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_element(&mut writer, root, options)?;
    String::from_utf8(writer.into_inner()).map_err(xml_error)
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    element: &Element,
    options: &ExportOptions,
) -> Result<(), MjError> {
    let mut start = BytesStart::new(element.tag.as_str());
    for (key, value) in element.attributes() {
        let text = render_value(value, options);
        start.push_attribute((key.as_str(), text.as_str()));
    }
    if element.children.is_empty() {
        writer.write_event(Event::Empty(start)).map_err(xml_error)?;
        return Ok(());
    }
    writer.write_event(Event::Start(start)).map_err(xml_error)?;
    for child in &element.children {
        write_element(writer, child, options)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.tag.as_str())))
        .map_err(xml_error)?;
    Ok(())
}

fn render_value(value: &AttrValue, options: &ExportOptions) -> String {
    match value {
        AttrValue::Text(s) => s.clone(),
        AttrValue::Numbers(values) => values
            .iter()
            .map(|v| format_number(*v, options))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Insert a blank line after every top-level element.
fn space_top_level(xml: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in xml.lines() {
        lines.push(line);
        if line.starts_with("  <") && (line.starts_with("  </") || line.ends_with("/>")) {
            lines.push("");
        }
    }
    lines.push("");
    lines.join("\n")
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn xml_error(e: impl std::fmt::Display) -> MjError {
    MjError::Serialization(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    const HASH: &str = "0123456789abcdef0123456789abcdef01234567";

    fn opts() -> ExportOptions {
        ExportOptions::default()
    }

    #[test]
    fn format_number_matches_printf_g() {
        let o = opts();
        assert_eq!(format_number(1.0, &o), "1");
        assert_eq!(format_number(0.5, &o), "0.5");
        assert_eq!(format_number(-0.123456789, &o), "-0.12346");
        assert_eq!(format_number(123456.0, &o), "1.2346e+05");
        assert_eq!(format_number(0.00012, &o), "0.00012");
        assert_eq!(format_number(0.000012, &o), "1.2e-05");
        assert_eq!(format_number(3e-8, &o), "0");
        assert_eq!(format_number(99999.9, &o), "1e+05");
    }

    #[test]
    fn format_number_honours_precision() {
        let o = ExportOptions {
            precision: 3,
            zero_threshold: 0.0,
        };
        assert_eq!(format_number(3.14159, &o), "3.14");
        assert_eq!(format_number(1e-9, &o), "1e-09");
    }

    #[test]
    fn unhashed_file_names() {
        assert_eq!(
            unhashed_file_name(&format!("thorax-{HASH}.obj")),
            Some("thorax.obj".to_string())
        );
        assert_eq!(unhashed_file_name("thorax.obj"), None);
        assert_eq!(unhashed_file_name(&format!("-{HASH}.obj")), None);
        let not_hex = format!("thorax-{}.obj", "z".repeat(40));
        assert_eq!(unhashed_file_name(&not_hex), None);
    }

    #[test]
    fn full_cleanup() {
        let xml = format!(
            r#"<mujoco model="fly">
  <default>
    <default class="/">
      <geom rgba="0.5 0.5 0.5 1"/>
    </default>
  </default>
  <asset>
    <mesh name="thorax" class="/" file="thorax-{HASH}.obj"/>
    <skin name="skin" file="skin-{HASH}.skn"/>
  </asset>
  <worldbody>
    <body name="thorax" class="/" gravcomp="0" pos="0 0 0.00000001">
      <geom name="g" mesh="thorax" class="/"/>
    </body>
  </worldbody>
</mujoco>"#
        );
        let root = parse_str(&xml).unwrap();
        let clean = to_clean_xml(&root, &opts()).unwrap();
        let expected = "\
<mujoco model=\"fly\">
  <default>
    <geom rgba=\"0.5 0.5 0.5 1\"/>
  </default>

  <asset>
    <mesh name=\"thorax\" file=\"thorax.obj\"/>
    <skin name=\"skin\" file=\"skin.skn\"/>
  </asset>

  <worldbody>
    <body name=\"thorax\" pos=\"0 0 0\">
      <geom name=\"g\" mesh=\"thorax\"/>
    </body>
  </worldbody>

</mujoco>
";
        assert_eq!(clean, expected);
    }

    #[test]
    fn non_wrapper_default_is_kept() {
        let root = parse_str(
            r#"<mujoco><default><default class="arm"><joint damping="0.1"/></default></default></mujoco>"#,
        )
        .unwrap();
        let clean = to_clean_xml(&root, &opts()).unwrap();
        assert!(clean.contains("<default class=\"arm\">"));
        assert!(clean.starts_with("<mujoco>\n  <default>\n"));
    }

    #[test]
    fn non_zero_gravcomp_survives() {
        let root = parse_str(r#"<mujoco><worldbody><body gravcomp="1"/></worldbody></mujoco>"#)
            .unwrap();
        let clean = to_clean_xml(&root, &opts()).unwrap();
        assert!(clean.contains("gravcomp=\"1\""));
    }

    #[test]
    fn integer_values_are_written_verbatim() {
        let root = parse_str(
            r#"<mujoco><worldbody><geom pos="100000 0 0" contype="65536" size="0.10"/></worldbody></mujoco>"#,
        )
        .unwrap();
        let clean = to_clean_xml(&root, &opts()).unwrap();
        assert!(clean.contains("pos=\"100000 0 0\""), "{clean}");
        assert!(clean.contains("contype=\"65536\""), "{clean}");
        assert!(clean.contains("size=\"0.1\""), "{clean}");
    }

    #[test]
    fn self_closing_top_level_gets_blank_line() {
        let root = parse_str(r#"<mujoco><compiler angle="radian"/><option timestep="0.002"/></mujoco>"#)
            .unwrap();
        let clean = to_clean_xml(&root, &opts()).unwrap();
        assert_eq!(
            clean,
            "<mujoco>\n  <compiler angle=\"radian\"/>\n\n  <option timestep=\"0.002\"/>\n\n</mujoco>\n"
        );
    }

    #[test]
    fn input_tree_is_not_modified() {
        let root = parse_str(r#"<mujoco><worldbody><body class="/"/></worldbody></mujoco>"#)
            .unwrap();
        let before = root.clone();
        to_clean_xml(&root, &opts()).unwrap();
        assert_eq!(root, before);
    }

    #[test]
    fn write_clean_xml_writes_same_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xml");
        let root = parse_str(r#"<mujoco model="m"/>"#).unwrap();
        write_clean_xml(&root, &path, &opts()).unwrap();
        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, to_clean_xml(&root, &opts()).unwrap());
    }
}
