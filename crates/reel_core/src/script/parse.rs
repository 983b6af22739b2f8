//! Parsing of the model's script response.

use serde::Deserialize;

use super::error::{GenerationError, GenerationResult};
use crate::models::SceneDescriptor;

#[derive(Debug, Deserialize)]
struct ScriptDocument {
    scenes: Vec<RawScene>,
}

#[derive(Debug, Deserialize)]
struct RawScene {
    #[serde(default)]
    voiceover: String,
    #[serde(default)]
    search_keyword: String,
}

/// Remove markdown code fences and any prose around the JSON object.
pub fn strip_wrappers(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```json") {
        body = rest;
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }
    let body = body.trim();

    match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => body,
    }
}

/// Parse model output into scene descriptors.
///
/// Never returns an empty list: an empty `scenes` array or any scene with a
/// blank field is an error.
pub fn parse_script(text: &str) -> GenerationResult<Vec<SceneDescriptor>> {
    let body = strip_wrappers(text);
    if body.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let document: ScriptDocument =
        serde_json::from_str(body).map_err(|e| GenerationError::parse(e.to_string()))?;

    if document.scenes.is_empty() {
        return Err(GenerationError::EmptyScript);
    }

    document
        .scenes
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let scene = SceneDescriptor::new(raw.voiceover.trim(), raw.search_keyword.trim());
            if scene.is_well_formed() {
                return Ok(scene);
            }
            let field = if scene.voiceover.is_empty() {
                "voiceover"
            } else {
                "search_keyword"
            };
            Err(GenerationError::invalid_scene(index, format!("empty {}", field)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"{"scenes": [
        {"voiceover": "Đại dương bao phủ hơn bảy mươi phần trăm bề mặt Trái Đất.", "search_keyword": "ocean aerial"},
        {"voiceover": "Rạn san hô là nhà của hàng nghìn loài cá.", "search_keyword": "coral reef"}
    ]}"#;

    #[test]
    fn parses_plain_json() {
        let scenes = parse_script(SCRIPT).unwrap();
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[1].search_keyword, "coral reef");
    }

    #[test]
    fn strips_code_fences() {
        let wrapped = format!("```json\n{}\n```", SCRIPT);
        let scenes = parse_script(&wrapped).unwrap();
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[0].search_keyword, "ocean aerial");
    }

    #[test]
    fn strips_surrounding_prose() {
        let wrapped = format!("Here is your script:\n{}\nEnjoy!", SCRIPT);
        assert_eq!(parse_script(&wrapped).unwrap().len(), 2);
    }

    #[test]
    fn trims_scene_fields() {
        let scenes =
            parse_script(r#"{"scenes":[{"voiceover":"  xin chào ","search_keyword":" city "}]}"#)
                .unwrap();
        assert_eq!(scenes[0], SceneDescriptor::new("xin chào", "city"));
    }

    #[test]
    fn rejects_empty_scene_list() {
        assert!(matches!(
            parse_script(r#"{"scenes": []}"#),
            Err(GenerationError::EmptyScript)
        ));
    }

    #[test]
    fn rejects_blank_keyword() {
        let err = parse_script(r#"{"scenes":[{"voiceover":"a","search_keyword":"  "}]}"#)
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidScene { index: 0, .. }));
    }

    #[test]
    fn names_the_blank_field() {
        let err = parse_script(
            r#"{"scenes":[{"voiceover":"a","search_keyword":"b"},{"voiceover":" ","search_keyword":"c"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::InvalidScene { index: 1, ref reason } if reason == "empty voiceover"
        ));
    }

    #[test]
    fn rejects_wrong_schema() {
        assert!(matches!(
            parse_script(r#"{"shots": [1, 2]}"#),
            Err(GenerationError::Parse(_))
        ));
        assert!(matches!(parse_script("not json"), Err(GenerationError::Parse(_))));
        assert!(matches!(parse_script("  "), Err(GenerationError::EmptyResponse)));
    }
}
