//! The subset of CSS selectors the sandbox understands: type, `#id`,
//! `.class`, `[attr]`, `[attr="value"]`, `*`, and the descendant combinator.

use crate::error::{E2eError, E2eResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttrSelector {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrSelector>,
}

/// Compounds separated by descendant combinators, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Selector {
    pub chain: Vec<Compound>,
}

fn invalid(selector: &str, why: &str) -> E2eError {
    E2eError::Driver(format!("invalid selector {:?}: {}", selector, why))
}

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

pub(crate) fn parse(selector: &str) -> E2eResult<Selector> {
    let chars: Vec<char> = selector.trim().chars().collect();
    let mut chain = Vec::new();
    let mut current = Compound::default();
    let mut started = false;
    let mut i = 0;

    let read_ident = |i: &mut usize| -> String {
        let start = *i;
        while *i < chars.len() && is_ident(chars[*i]) {
            *i += 1;
        }
        chars[start..*i].iter().collect()
    };

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' => {
                if started {
                    chain.push(std::mem::take(&mut current));
                    started = false;
                }
                i += 1;
            }
            '*' => {
                started = true;
                i += 1;
            }
            '#' => {
                i += 1;
                let id = read_ident(&mut i);
                if id.is_empty() {
                    return Err(invalid(selector, "empty id"));
                }
                current.id = Some(id);
                started = true;
            }
            '.' => {
                i += 1;
                let class = read_ident(&mut i);
                if class.is_empty() {
                    return Err(invalid(selector, "empty class"));
                }
                current.classes.push(class);
                started = true;
            }
            '[' => {
                i += 1;
                let name = read_ident(&mut i);
                if name.is_empty() {
                    return Err(invalid(selector, "empty attribute name"));
                }
                let value = match chars.get(i) {
                    Some(']') => None,
                    Some('=') => {
                        i += 1;
                        match chars.get(i) {
                            Some(&quote) if quote == '"' || quote == '\'' => {
                                i += 1;
                                let start = i;
                                while i < chars.len() && chars[i] != quote {
                                    i += 1;
                                }
                                if i >= chars.len() {
                                    return Err(invalid(selector, "unterminated string"));
                                }
                                let value: String = chars[start..i].iter().collect();
                                i += 1;
                                Some(value)
                            }
                            _ => Some(read_ident(&mut i)),
                        }
                    }
                    _ => return Err(invalid(selector, "unsupported attribute operator")),
                };
                if chars.get(i) != Some(&']') {
                    return Err(invalid(selector, "expected ]"));
                }
                i += 1;
                current.attrs.push(AttrSelector { name, value });
                started = true;
            }
            c if is_ident(c) => {
                if started {
                    return Err(invalid(selector, "type selector must come first"));
                }
                current.tag = Some(read_ident(&mut i).to_ascii_lowercase());
                started = true;
            }
            other => {
                return Err(invalid(selector, &format!("unsupported character {:?}", other)));
            }
        }
    }
    if started {
        chain.push(current);
    }
    if chain.is_empty() {
        return Err(invalid(selector, "empty selector"));
    }
    Ok(Selector { chain })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_descendant_chain() {
        let sel = parse(r#"thead input[placeholder="Age"]"#).unwrap();
        assert_eq!(sel.chain.len(), 2);
        assert_eq!(sel.chain[0].tag.as_deref(), Some("thead"));
        assert_eq!(sel.chain[1].tag.as_deref(), Some("input"));
        assert_eq!(
            sel.chain[1].attrs,
            vec![AttrSelector { name: "placeholder".into(), value: Some("Age".into()) }]
        );
    }

    #[test]
    fn test_parse_compound_tag_and_class() {
        let sel = parse("ul.options-list nb-option").unwrap();
        assert_eq!(sel.chain[0].tag.as_deref(), Some("ul"));
        assert_eq!(sel.chain[0].classes, vec!["options-list"]);
        assert_eq!(sel.chain[1].tag.as_deref(), Some("nb-option"));
    }

    #[test]
    fn test_parse_id_and_bare_attribute() {
        let sel = parse("#exampleInputEmail1").unwrap();
        assert_eq!(sel.chain[0].id.as_deref(), Some("exampleInputEmail1"));

        let sel = parse(".expand-state [data-name]").unwrap();
        assert_eq!(sel.chain[1].attrs[0].value, None);
    }

    #[test]
    fn test_rejects_unsupported_syntax() {
        assert!(parse("ul > li").is_err());
        assert!(parse("[for~=\"x\"]").is_err());
        assert!(parse("   ").is_err());
        assert!(parse("[type=\"radio]").is_err());
    }
}
