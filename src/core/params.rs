use crate::core::expand::{expand, ExpansionSettings};
use crate::domain::model::{normalize_flag, ParsedFlags};
use crate::utils::error::{Result, SweepError};
use std::collections::HashMap;

fn is_option(token: &str) -> bool {
    token.starts_with('-')
}

/// Classify a raw token stream into solo flags and flags with value domains.
///
/// A flag followed by another flag (or by nothing) is a solo flag; otherwise
/// the next token is its value expression. There is no registry of known
/// flags, so a negative number in value position reads as a solo flag.
///
/// Records store names without dashes, so two spellings of one name (`-s` and
/// `--s`), or one name used both as a solo flag and with a value, are
/// rejected. Repeating the same spelling is allowed.
pub fn parse_params<S: AsRef<str>>(tokens: &[S], settings: &ExpansionSettings) -> Result<ParsedFlags> {
    let mut parsed = ParsedFlags::default();
    // 正規化名稱 -> (原始寫法, 是否帶值)
    let mut seen: HashMap<&str, (&str, bool)> = HashMap::new();
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i].as_ref();
        if !is_option(token) {
            return Err(SweepError::UnexpectedToken {
                token: token.to_string(),
            });
        }

        let next = tokens.get(i + 1).map(|next| next.as_ref());
        let takes_value = matches!(next, Some(next) if !is_option(next));
        match seen.get(normalize_flag(token)) {
            Some(&(previous, had_value)) if previous != token || had_value != takes_value => {
                return Err(SweepError::DuplicateFlag {
                    flag: token.to_string(),
                    previous: previous.to_string(),
                });
            }
            Some(_) => {}
            None => {
                seen.insert(normalize_flag(token), (token, takes_value));
            }
        }

        match next {
            Some(next) if takes_value => {
                let domain = expand(next, settings)?;
                tracing::debug!("{} -> {} value(s)", token, domain.len());
                parsed.set_domain(token, domain);
                i += 2;
            }
            _ => {
                parsed.add_solo(token);
                i += 1;
            }
        }
    }

    Ok(parsed)
}
