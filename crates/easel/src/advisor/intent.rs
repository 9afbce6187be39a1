// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use easel_contracts::ChartType;
use once_cell::sync::Lazy;
use regex::Regex;

/// Keyword categories in override priority order. The first category with
/// any matching term decides the forced chart type.
const INTENT_RULES: [(IntentCategory, &[&str]); 5] = [
    (
        IntentCategory::Trend,
        &[
            "趋势", "变化", "增长", "走势", "trend", "change", "growth", "over time",
        ],
    ),
    (
        IntentCategory::Proportion,
        &[
            "占比", "比例", "份额", "构成", "ratio", "share", "proportion", "percentage",
        ],
    ),
    (
        IntentCategory::Comparison,
        &["对比", "比较", "排名", "compare", "comparison", "versus", "vs", "ranking"],
    ),
    (
        IntentCategory::Distribution,
        &["分布", "密度", "distribution", "density"],
    ),
    (
        IntentCategory::Correlation,
        &["相关", "关系", "关联", "correlation", "relationship", "correlate"],
    ),
];

/// ASCII terms match whole words, with an optional plural suffix; CJK
/// terms match anywhere.
static KEYWORD_MATCHERS: Lazy<Vec<Vec<Option<Regex>>>> = Lazy::new(|| {
    INTENT_RULES
        .iter()
        .map(|(_, keywords)| {
            keywords
                .iter()
                .map(|kw| {
                    kw.is_ascii().then(|| {
                        Regex::new(&format!(r"\b{}(?:s|es)?\b", regex::escape(kw)))
                            .expect("escaped keyword is a valid pattern")
                    })
                })
                .collect()
        })
        .collect()
});

/// Question category that forces a particular chart type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentCategory {
    Trend,
    Proportion,
    Comparison,
    Distribution,
    Correlation,
}

impl IntentCategory {
    pub fn chart_type(&self) -> ChartType {
        match self {
            IntentCategory::Trend => ChartType::Line,
            IntentCategory::Proportion => ChartType::Pie,
            IntentCategory::Comparison => ChartType::Bar,
            IntentCategory::Distribution => ChartType::Heatmap,
            IntentCategory::Correlation => ChartType::Scatter,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IntentCategory::Trend => "trend",
            IntentCategory::Proportion => "proportion",
            IntentCategory::Comparison => "comparison",
            IntentCategory::Distribution => "distribution",
            IntentCategory::Correlation => "correlation",
        }
    }
}

/// Category that matched, and the keyword that triggered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentMatch {
    pub category: IntentCategory,
    pub keyword: &'static str,
}

/// Scans the question for intent keywords. Categories are checked in
/// fixed order and the first one with a match wins.
pub fn detect_intent(question: &str) -> Option<IntentMatch> {
    let haystack = question.to_lowercase();
    INTENT_RULES
        .iter()
        .zip(KEYWORD_MATCHERS.iter())
        .find_map(|((category, keywords), matchers)| {
            keywords
                .iter()
                .zip(matchers)
                .find(|(kw, matcher)| match matcher {
                    Some(re) => re.is_match(&haystack),
                    None => haystack.contains(**kw),
                })
                .map(|(kw, _)| IntentMatch {
                    category: *category,
                    keyword: *kw,
                })
        })
}
