//! Free-text character profiles.
//!
//! A profile is Markdown the author edits by hand. The engine only creates it
//! from a template and reads a short excerpt back for prompts.

use story_rules::CharacterId;

const TEMPLATE_FIELDS: [&str; 10] = [
    "姓名", "境界", "状态", "武器", "装备", "法宝", "物品", "心法", "特质", "技能",
];

/// Initial profile document for a new character.
pub fn profile_template(name: &str, id: &CharacterId) -> String {
    let mut lines = vec![
        format!("# {} 动态档案", name),
        String::new(),
        format!("- 人物ID: `{}`", id),
        "- 说明: 作者自由书写区，支持任意 Markdown。".to_string(),
        String::new(),
        "## 当前能力与设定".to_string(),
    ];
    lines.extend(TEMPLATE_FIELDS.iter().map(|field| format!("【{}：】", field)));
    lines.extend([
        String::new(),
        "## 备注".to_string(),
        "- 可以继续追加段落、表格、引用或列表。".to_string(),
        String::new(),
    ]);
    lines.join("\n")
}

/// Author-written text of a profile, whitespace-collapsed and cut to `max_chars`.
///
/// Headings, blank lines, untouched template lines and empty `【field：】`
/// slots are skipped. A profile that still equals its template yields `""`.
pub fn profile_excerpt(text: &str, name: &str, id: &CharacterId, max_chars: usize) -> String {
    let template = profile_template(name, id);
    let template_lines: Vec<&str> = template.lines().map(str::trim).collect();

    let joined = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| !template_lines.contains(line))
        .filter(|line| !is_empty_field(line))
        .map(|line| line.trim_start_matches("- ").trim())
        .collect::<Vec<_>>()
        .join(" ");
    let collapsed = joined.split_whitespace().collect::<Vec<_>>().join(" ");

    truncate_chars(&collapsed, max_chars)
}

fn is_empty_field(line: &str) -> bool {
    line.starts_with('【') && (line.ends_with("：】") || line.ends_with(":】"))
}

/// Cut to at most `max_chars` characters, marking the cut with `…`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(max_chars - 1).collect();
    cut.push('…');
    cut
}
