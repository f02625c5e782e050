//! Model documents: telling full documents from bare procedure text, and
//! wrapping the latter in a minimal `.nlogox` envelope.

/// How far into the text to look for a model root tag.
const ROOT_TAG_WINDOW: usize = 200;

const ENVELOPE_HEAD: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<model version="NetLogo 7.0.3" snapToGrid="false">
  <code>"#;

const ENVELOPE_TAIL: &str = r#"</code>
  <widgets>
    <view x="210" wrappingAllowedX="true" y="10" frameRate="30.0" minPycor="-16" height="430" showTickCounter="true" patchSize="13.0" fontSize="10" wrappingAllowedY="true" width="430" tickCounterLabel="ticks" maxPycor="16" updateMode="1" maxPxcor="16" minPxcor="-16"></view>
  </widgets>
  <info><![CDATA[## WHAT IS IT?

A model created via NetLogo MCP Server.]]></info>
  <turtleShapes>
    <shape name="default" rotatable="true" editableColorIndex="0">
      <polygon color="-1920102913" filled="true" marked="true">
        <point x="150" y="5"></point>
        <point x="40" y="250"></point>
        <point x="150" y="205"></point>
        <point x="260" y="250"></point>
      </polygon>
    </shape>
    <shape name="circle" rotatable="false" editableColorIndex="0">
      <circle color="-1920102913" filled="true" marked="true" x="0" y="0" diameter="300"></circle>
    </shape>
  </turtleShapes>
  <linkShapes>
    <shape name="default" curviness="0.0">
      <lines>
        <line x="-0.2" visible="false">
          <dash value="0.0"></dash>
          <dash value="1.0"></dash>
        </line>
        <line x="0.0" visible="true">
          <dash value="1.0"></dash>
          <dash value="0.0"></dash>
        </line>
        <line x="0.2" visible="false">
          <dash value="0.0"></dash>
          <dash value="1.0"></dash>
        </line>
      </lines>
      <indicator>
        <shape name="link direction" rotatable="true" editableColorIndex="0">
          <line endX="90" startY="150" marked="true" color="-1920102913" endY="180" startX="150"></line>
          <line endX="210" startY="150" marked="true" color="-1920102913" endY="180" startX="150"></line>
        </shape>
      </indicator>
    </shape>
  </linkShapes>
</model>
"#;

/// Whether `code` is already a complete model document.
pub fn is_full_document(code: &str) -> bool {
    if code.trim_start().starts_with("<?xml") {
        return true;
    }
    let window: String = code.chars().take(ROOT_TAG_WINDOW).collect();
    window.contains("<model")
}

/// Escape text for embedding as XML character data.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Wrap bare procedure text in the fixed `.nlogox` envelope.
pub fn wrap_procedures(procedures: &str) -> String {
    let escaped = escape_xml(procedures);
    let mut document =
        String::with_capacity(ENVELOPE_HEAD.len() + escaped.len() + ENVELOPE_TAIL.len());
    document.push_str(ENVELOPE_HEAD);
    document.push_str(&escaped);
    document.push_str(ENVELOPE_TAIL);
    document
}

/// The loadable document for authoring input: verbatim when it is already a
/// full document, wrapped otherwise.
pub fn prepare_document(code: &str) -> String {
    if is_full_document(code) {
        code.to_string()
    } else {
        wrap_procedures(code)
    }
}
