use std::sync::LazyLock;

use regex::Regex;

use crate::store::GlobalAliases;

/// A parsed headcount change. `apply` never goes below zero; the safety
/// ceiling is checked by the caller so a refusal can be rendered without
/// touching state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOp {
    Set(u32),
    Add(u32),
    Sub(u32),
}

impl UpdateOp {
    pub fn apply(self, prev: u32) -> u32 {
        match self {
            UpdateOp::Set(n) => n,
            UpdateOp::Add(n) => prev.saturating_add(n),
            UpdateOp::Sub(n) => prev.saturating_sub(n),
        }
    }
}

/// What an alias-triggered message asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AliasAction {
    Query,
    Update(UpdateOp),
}

static UPDATE_EXPR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-]?)(\d+)$").expect("update grammar regex"));

/// Parse the remainder after a matched alias: `[+|-]?<digits>`.
pub fn parse_update_expr(text: &str) -> Option<UpdateOp> {
    let caps = UPDATE_EXPR.captures(text)?;
    let number: u32 = caps[2].parse().ok()?;
    Some(match &caps[1] {
        "+" => UpdateOp::Add(number),
        "-" => UpdateOp::Sub(number),
        _ => UpdateOp::Set(number),
    })
}

/// Resolve free text against the alias map.
///
/// Longest known alias that prefixes the text wins; the remainder must be a
/// query token (`j` / `几`) or an update expression, otherwise the text is
/// not an alias command at all and the caller falls through to id/city
/// interpretation. Purely numeric input that matched no alias prefix gets
/// one more chance: every split point, longest left part first, is tried as
/// `<known alias><digits>` and treated as a set command. That covers
/// numeric-looking aliases like "777" typed together with a headcount.
pub fn resolve(aliases: &GlobalAliases, text: &str) -> Option<(String, AliasAction)> {
    let text = text.trim();

    let mut names: Vec<&String> = aliases.alias_to_ids.keys().collect();
    names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    for alias in names {
        if let Some(rest) = text.strip_prefix(alias.as_str()) {
            let rest = rest.trim();
            if rest == "j" || rest == "几" {
                return Some((alias.clone(), AliasAction::Query));
            }
            if let Some(op) = parse_update_expr(rest) {
                return Some((alias.clone(), AliasAction::Update(op)));
            }
            // 最长前缀已命中但剩余部分不合法; 不再尝试更短的简称,
            // 纯数字输入还有下面的拆分兜底
            break;
        }
    }

    if text.len() >= 2 && text.bytes().all(|b| b.is_ascii_digit()) {
        for split in (1..text.len()).rev() {
            let (left, right) = text.split_at(split);
            if aliases.alias_to_ids.contains_key(left) {
                if let Ok(number) = right.parse::<u32>() {
                    return Some((left.to_string(), AliasAction::Update(UpdateOp::Set(number))));
                }
            }
        }
    }

    None
}
