/*!
 * Tests for Advanced SubStation Alpha parsing and serialization
 */

use subresync::formats::{ass, markup, AssDefaults, LineEnding, SerializeOptions};
use subresync::subtitle_processor::{Cue, Document, SubtitleFormat};
use crate::common;

const SSA_V4: &str = "[Script Info]
ScriptType: v4.00

[V4 Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, TertiaryColour, BackColour, Bold, Italic, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, AlphaLevel, Encoding
Style: Default,Tahoma,24,16777215,65535,65535,-2147483640,-1,0,1,1,2,2,30,30,30,0,0

[Events]
Format: Marked, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
Dialogue: Marked=0,0:00:01.00,0:00:02.00,Default,,0000,0000,0000,,Old school
";

fn events(body: &str) -> String {
    format!(
        "[Script Info]\nScriptType: v4.00+\n\n[Events]\nFormat: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n{}",
        body
    )
}

#[test]
fn test_parse_withSampleScript_shouldReadDialogueAndHeader() {
    let doc = ass::parse(common::SAMPLE_ASS).unwrap();

    assert_eq!(doc.format, SubtitleFormat::Ass);
    assert_eq!(doc.len(), 2, "Comment events must not become cues");
    assert_eq!(doc.cues[0].start.as_millis(), 1_000);
    assert_eq!(doc.cues[0].end.as_millis(), 2_500);
    assert_eq!(doc.cues[0].text, vec!["{\\i1}Hello{\\i0}, world"]);
    assert_eq!(doc.cues[1].text, vec!["First line", "Second line"]);

    let header = doc.header.as_ref().unwrap();
    assert_eq!(header.info("title"), Some("Sample"));
    assert_eq!(header.info("PlayResX"), Some("640"));
    assert_eq!(header.styles.len(), 1);
    assert!(header.style_format.as_deref().unwrap().contains("OutlineColour"));

    let style = doc.cues[0].style.as_ref().unwrap();
    assert_eq!(style.get("Style").map(String::as_str), Some("Default"));
    assert_eq!(style.get("Layer").map(String::as_str), Some("0"));
    assert!(!style.contains_key("Text"));
}

/// Field order comes from the Format line, not from a fixed layout
#[test]
fn test_parse_withCustomEventFormat_shouldFollowFormatLine() {
    let text = "[Events]\nFormat: Start, End, Style, Text\nDialogue: 0:00:01.00,0:00:02.00,Main,Hi, there\n";
    let doc = ass::parse(text).unwrap();

    assert_eq!(doc.cues[0].text, vec!["Hi, there"]);
    assert_eq!(doc.cues[0].end.as_millis(), 2_000);
    assert_eq!(
        doc.cues[0].style.as_ref().and_then(|s| s.get("Style")).map(String::as_str),
        Some("Main")
    );
}

#[test]
fn test_parse_withoutFormatLine_shouldUseDefaultFields() {
    let text = "[Events]\nDialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Plain\n";
    let doc = ass::parse(text).unwrap();
    assert_eq!(doc.cues[0].text, vec!["Plain"]);
}

#[test]
fn test_parse_withSoftLineBreak_shouldSplitLines() {
    let doc = ass::parse(&events("Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,one\\ntwo\n")).unwrap();
    assert_eq!(doc.cues[0].text, vec!["one", "two"]);
}

#[test]
fn test_parse_withSsaV4Script_shouldReadMarkedLayout() {
    let doc = ass::parse(SSA_V4).unwrap();

    assert_eq!(doc.len(), 1);
    assert_eq!(doc.cues[0].text, vec!["Old school"]);
    assert!(markup::ass_style_features(&doc.cues[0]).is_empty());
}

#[test]
fn test_parse_withEmptyEvents_shouldProduceNoCues() {
    let doc = ass::parse("[Script Info]\nTitle: x\n\n[Events]\n").unwrap();
    assert!(doc.is_empty());
}

#[test]
fn test_parse_withoutEventsSection_shouldFail() {
    let err = ass::parse("[Script Info]\nTitle: x\n").unwrap_err();
    assert_eq!(err.line, 1);
    assert!(err.reason.contains("missing [Events] section"));
}

#[test]
fn test_parse_withTooFewFields_shouldNameLine() {
    let err = ass::parse(&events("Dialogue: 0,0:00:01.00\n")).unwrap_err();
    assert_eq!(err.line, 6);
    assert!(err.reason.contains("expected 10 fields, found 2"));
}

#[test]
fn test_parse_withMalformedStart_shouldFail() {
    let err = ass::parse(&events("Dialogue: 0,bad,0:00:02.00,Default,,0,0,0,,x\n")).unwrap_err();
    assert_eq!(err.line, 6);
    assert!(err.reason.contains("malformed start timestamp"));
}

#[test]
fn test_parse_withHugeHours_shouldFail() {
    let err = ass::parse(&events(
        "Dialogue: 0,99999999999999:00:00.00,99999999999999:00:01.00,Default,,0,0,0,,x\n",
    ))
    .unwrap_err();
    assert_eq!(err.line, 6);
    assert!(err.reason.contains("malformed start timestamp"));
}

#[test]
fn test_parse_withInvertedRange_shouldFail() {
    let err = ass::parse(&events("Dialogue: 0,0:00:05.00,0:00:01.00,Default,,0,0,0,,x\n")).unwrap_err();
    assert!(err.reason.contains("ends before it starts"));
}

#[test]
fn test_parse_withFormatMissingText_shouldFail() {
    let err = ass::parse("[Events]\nFormat: Layer, Start, End\n").unwrap_err();
    assert_eq!(err.line, 2);
    assert!(err.reason.contains("no Text field"));
}

/// SRT input gets the configured default header and translated markup
#[test]
fn test_serialize_fromSrt_shouldWriteDefaultHeaderAndEvents() {
    let doc = subresync::formats::srt::parse(common::SAMPLE_SRT).unwrap();
    let out = ass::serialize(&doc, &SerializeOptions::default());

    assert!(out.warnings.is_empty());
    assert!(out.text.starts_with("[Script Info]\n"));
    assert!(out.text.contains("ScriptType: v4.00+\n"));
    assert!(out.text.contains("PlayResX: 384\n"));
    assert!(out.text.contains("[V4+ Styles]\n"));
    assert!(out.text.contains("Style: Default,Arial,20,"));
    assert!(out.text.contains("Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n"));
    assert!(out.text.contains("Dialogue: 0,0:00:01.00,0:00:04.00,Default,,0,0,0,,This is a test subtitle.\n"));
    assert!(out.text.contains("Dialogue: 0,0:00:05.00,0:00:09.00,Default,,0,0,0,,It contains {\\i1}multiple{\\i0} entries.\n"));
    assert!(out.text.contains(",,For testing purposes.\\NSecond line.\n"));
}

#[test]
fn test_serialize_withCustomDefaults_shouldUseThem() {
    let options = SerializeOptions {
        ass: AssDefaults {
            play_res_x: 1920,
            play_res_y: 1080,
            font_name: "Verdana".to_string(),
            font_size: 48,
        },
        ..Default::default()
    };
    let out = ass::serialize(&Document::new(SubtitleFormat::Srt), &options);

    assert!(out.text.contains("PlayResX: 1920"));
    assert!(out.text.contains("PlayResY: 1080"));
    assert!(out.text.contains("Style: Default,Verdana,48,"));
}

/// An empty document still yields a complete header
#[test]
fn test_serialize_withEmptyDocument_shouldWriteHeaderOnly() {
    let out = ass::serialize(&Document::new(SubtitleFormat::Srt), &SerializeOptions::default());

    assert!(out.text.contains("[Script Info]"));
    assert!(out.text.contains("[Events]"));
    assert!(!out.text.contains("Dialogue:"));
    assert!(ass::parse(&out.text).unwrap().is_empty());
}

#[test]
fn test_serialize_fromAss_shouldKeepScriptInfoAndStyles() {
    let doc = ass::parse(common::SAMPLE_ASS).unwrap();
    let out = ass::serialize(&doc, &SerializeOptions::default());

    assert!(out.text.contains("Title: Sample\n"));
    assert!(out.text.contains("PlayResX: 640\n"));
    assert!(out.text.contains("Style: Default,Arial,20,&H00FFFFFF"));
    assert!(!out.text.contains("PlayResX: 384"));
}

#[test]
fn test_serialize_fromSsa_shouldUpgradeScriptTypeAndStyles() {
    let doc = ass::parse(SSA_V4).unwrap();
    let out = ass::serialize(&doc, &SerializeOptions::default());

    assert!(out.text.contains("ScriptType: v4.00+\n"));
    assert!(!out.text.contains("Tahoma"));
    assert!(out.text.contains("Style: Default,Arial,20,"));
    assert!(out.text.contains("Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0000,0000,0000,,Old school"));
}

#[test]
fn test_serialize_withSubCentisecondTiming_shouldRoundToCentiseconds() {
    let doc = Document::with_cues(SubtitleFormat::Srt, vec![Cue::new(1_234, 2_345, "x")]);
    let out = ass::serialize(&doc, &SerializeOptions::default());
    assert!(out.text.contains("Dialogue: 0,0:00:01.23,0:00:02.35,"));
}

#[test]
fn test_serialize_withCrlf_shouldNotLeaveBareLf() {
    let doc = ass::parse(common::SAMPLE_ASS).unwrap();
    let options = SerializeOptions {
        eol: LineEnding::Crlf,
        ..Default::default()
    };
    let out = ass::serialize(&doc, &options);

    assert!(out.text.ends_with("\r\n"));
    assert!(!out.text.replace("\r\n", "").contains('\n'));
}

#[test]
fn test_serialize_fromSrtWithFontFace_shouldWarn() {
    let doc = Document::with_cues(
        SubtitleFormat::Srt,
        vec![Cue::new(0, 1_000, "<font face=\"Arial\">x</font>")],
    );
    let out = ass::serialize(&doc, &SerializeOptions::default());

    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].cue, 1);
    assert_eq!(out.warnings[0].target, "ASS");
    assert!(out.text.contains(",,x\n"));
}

#[test]
fn test_roundTrip_withAssDocument_shouldKeepCues() {
    let original = ass::parse(common::SAMPLE_ASS).unwrap();
    let written = ass::serialize(&original, &SerializeOptions::default());
    let reparsed = ass::parse(&written.text).unwrap();

    assert_eq!(reparsed.cues, original.cues);
}
