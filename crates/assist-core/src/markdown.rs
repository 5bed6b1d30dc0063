//! Markdown repair for generator output.
//!
//! The assistant often streams block markers glued to the preceding text
//! (`介绍###亮点`, `如下：- 论坛`). [`normalize`] inserts the missing
//! separators so the answer renders as the intended markup.
//!
//! Always run it on the full accumulated answer: a marker can be split across
//! two content deltas, so normalizing fragments one by one is wrong.

use regex::Regex;
use std::sync::LazyLock;

/// `###Title` -> `### Title`
static HEADING_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(#{1,6})([^\s#])").expect("heading space regex is valid"));

/// `text### Title` -> `text\n\n### Title`
static HEADING_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^\n#])(#{1,6} )").expect("heading break regex is valid"));

/// Line-start heading still missing its space.
static LINE_START_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(#{1,6})([^\s#])").expect("line start heading regex is valid")
});

/// `如下：- 论坛` -> `如下：\n\n- 论坛`
static BULLET_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^\s#-])[ \t]*(- )").expect("bullet break regex is valid"));

/// `步骤：1. 报名` -> `步骤：\n\n1. 报名`
static ORDERED_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([^\s\d#-])[ \t]*(\d+\. )").expect("ordered break regex is valid")
});

/// Repairs heading and list syntax in `text`.
///
/// Well-formed markdown passes through unchanged. The repair pass is applied
/// until it stops changing the text, so `normalize(&normalize(s)) ==
/// normalize(s)` for every input and it is safe to call on each re-render of
/// a still-streaming answer. Adjacent markers (`C# #2`, `1. 2. `) need more
/// than one pass because a match consumes the character in front of the
/// next marker.
///
/// No rule looks across a line break, so normalizing text line by line gives
/// the same result as normalizing it whole.
pub fn normalize(text: &str) -> String {
    let mut current = text.to_string();
    // Each pass only inserts separators in front of markers that lack one.
    loop {
        let next = repair_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn repair_pass(text: &str) -> String {
    let text = HEADING_SPACE.replace_all(text, "${1} ${2}");
    let text = HEADING_BREAK.replace_all(&text, "${1}\n\n${2}");
    let text = LINE_START_HEADING.replace_all(&text, "${1} ${2}");
    let text = BULLET_BREAK.replace_all(&text, "${1}\n\n${2}");
    let text = ORDERED_BREAK.replace_all(&text, "${1}\n\n${2}");
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_heading_missing_space() {
        assert_eq!(normalize("###Title"), "### Title");
        assert_eq!(normalize("#标题"), "# 标题");
    }

    #[test]
    fn test_heading_glued_to_text() {
        assert_eq!(normalize("介绍###亮点"), "介绍\n\n### 亮点");
        assert_eq!(normalize("介绍### 亮点"), "介绍\n\n### 亮点");
    }

    #[test]
    fn test_bullets_glued_to_text() {
        assert_eq!(
            normalize("活动如下：- 论坛- 展会"),
            "活动如下：\n\n- 论坛\n\n- 展会"
        );
    }

    #[test]
    fn test_numbered_items_glued_to_text() {
        assert_eq!(
            normalize("步骤：1. 报名 2. 参会"),
            "步骤：\n\n1. 报名\n\n2. 参会"
        );
    }

    #[test]
    fn test_well_formed_input_is_unchanged() {
        let text = "# 标题\n\n正文第一段。\n\n- 论坛\n- 展会\n\n1. 报名\n2. 参会\n\n  - 嵌套\n\n圆周率约为 3.14";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn test_seven_hashes_are_not_a_heading_run() {
        let once = normalize("#######x");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "纯文本，没有任何标记",
            "###Title",
            "介绍###亮点内容##次级",
            "活动如下：- 论坛- 展会 - 沙龙",
            "步骤：1. 报名 2. 参会 10. 反馈",
            "C# 和 Rust#1 都提到了",
            "## 1. 概览\n- 第一项1. 子项",
            "#######x ######y",
            "a#\n#b\n# c\n\n-d - e",
            "近期有一场活动。###时间：周五- 地点：会议中心",
        ];

        for sample in samples {
            let once = normalize(sample);
            let twice = normalize(&once);
            assert_eq!(twice, once, "normalize is not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_adjacent_markers_settle_in_one_call() {
        assert_eq!(normalize("用 C# #2 版本"), "用 C\n\n# \n\n# 2 版本");
        assert_eq!(normalize(" a.1. 2. 2 a"), " a.\n\n1.\n\n2. 2 a");
        assert_eq!(normalize("清单：- - 项"), "清单：\n\n- - 项");
    }

    #[test]
    fn test_marker_split_across_deltas() {
        let mut buffer = String::new();
        let mut renders = Vec::new();
        for delta in ["介绍#", "##亮点", "：- 论", "坛"] {
            buffer.push_str(delta);
            renders.push(normalize(&buffer));
        }

        assert_eq!(renders.last().unwrap(), "介绍\n\n### 亮点：\n\n- 论坛");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(text in "[#\\- 1.\na中\t2]{0,48}") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_normalize_is_line_local(
            head in "[#\\- 1.a中\t2]{0,24}",
            tail in "[#\\- 1.\na中\t2]{0,24}",
        ) {
            let whole = normalize(&format!("{head}\n{tail}"));
            prop_assert_eq!(whole, format!("{}\n{}", normalize(&head), normalize(&tail)));
        }
    }
}
