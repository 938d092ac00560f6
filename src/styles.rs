use std::collections::HashMap;

use crate::model::Style;

/// Style table with `based_on` chains flattened. Built once per layout run.
pub struct StyleMap {
    styles: HashMap<String, Style>,
}

impl StyleMap {
    /// Resolve the raw style list: each style inherits the properties its
    /// base leaves unset, following `based_on` one level at a time until the
    /// chain is exhausted. A missing base is logged and simply not merged.
    pub fn resolve(styles: &[Style], debug: bool) -> Self {
        let raw: HashMap<&str, &Style> = styles.iter().map(|s| (s.id.as_str(), s)).collect();

        let mut resolved: HashMap<String, Style> = HashMap::new();
        for style in styles {
            let mut merged = style.clone();

            let mut base_id = style.based_on.clone();
            let mut depth = 0;
            while let Some(id) = base_id {
                // cycle guard
                if depth > 16 {
                    log::warn!("style {} has a based-on chain deeper than 16, stopping", style.id);
                    break;
                }
                depth += 1;

                let Some(base) = raw.get(id.as_str()) else {
                    if debug {
                        log::warn!("can't find base style {id}");
                    }
                    break;
                };

                if merged.page_break_before.is_none() {
                    merged.page_break_before = base.page_break_before;
                }
                if merged.numbering.is_none() {
                    merged.numbering = base.numbering.clone();
                }
                for (key, value) in &base.declarations {
                    merged
                        .declarations
                        .entry(key.clone())
                        .or_insert_with(|| value.clone());
                }

                base_id = base.based_on.clone();
            }

            if let Some(ref linked) = style.linked
                && !raw.contains_key(linked.as_str())
                && debug
            {
                log::warn!("can't find linked style {linked}");
            }

            resolved.insert(merged.id.clone(), merged);
        }

        Self { styles: resolved }
    }

    pub fn find(&self, name: Option<&str>) -> Option<&Style> {
        name.and_then(|n| self.styles.get(n))
    }

    pub fn page_break_before(&self, style_name: Option<&str>) -> bool {
        self.find(style_name)
            .and_then(|s| s.page_break_before)
            .unwrap_or(false)
    }

    /// Structured declarations for a style id, replacing stylesheet string
    /// generation: callers map these to whatever output format they render to.
    pub fn declarations(&self, style_id: &str) -> Option<&HashMap<String, String>> {
        self.styles.get(style_id).map(|s| &s.declarations)
    }
}
