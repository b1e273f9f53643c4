//! Minimal mutable DOM tree for the sandbox

use std::collections::{BTreeMap, HashMap};

use super::app::Behavior;
use super::selector::{Compound, Selector};

pub(crate) type NodeId = u64;

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub text: String,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub hidden: bool,
    pub checked: bool,
    pub disabled: bool,
    pub value: String,
    pub behavior: Behavior,
}

impl Node {
    pub fn has_class(&self, class: &str) -> bool {
        self.attrs
            .get("class")
            .map_or(false, |c| c.split_whitespace().any(|x| x == class))
    }

    pub fn input_type(&self) -> Option<&str> {
        if self.tag == "input" {
            Some(self.attrs.get("type").map_or("text", String::as_str))
        } else {
            None
        }
    }

    fn matches(&self, compound: &Compound) -> bool {
        if let Some(tag) = &compound.tag {
            if &self.tag != tag {
                return false;
            }
        }
        if let Some(id) = &compound.id {
            if self.attrs.get("id") != Some(id) {
                return false;
            }
        }
        if !compound.classes.iter().all(|c| self.has_class(c)) {
            return false;
        }
        compound.attrs.iter().all(|a| match (&a.value, self.attrs.get(&a.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(want), Some(have)) => want == have,
        })
    }
}

/// Declarative element description inserted with [`Dom::insert`].
#[derive(Debug, Clone)]
pub(crate) struct El {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<El>,
    hidden: bool,
    checked: bool,
    disabled: bool,
    behavior: Behavior,
}

pub(crate) fn el(tag: &str) -> El {
    El {
        tag: tag.to_string(),
        attrs: Vec::new(),
        text: String::new(),
        children: Vec::new(),
        hidden: false,
        checked: false,
        disabled: false,
        behavior: Behavior::Inert,
    }
}

impl El {
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.push((name.to_string(), value.into()));
        self
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn child(mut self, child: El) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = El>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn on(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }
}

pub(crate) struct Dom {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    next_id: NodeId,
}

impl Dom {
    pub fn new() -> Self {
        let mut dom = Dom {
            nodes: HashMap::new(),
            root: 0,
            next_id: 1,
        };
        dom.root = dom.create(el("body"), None);
        dom
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    fn create(&mut self, desc: El, parent: Option<NodeId>) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        let node = Node {
            tag: desc.tag,
            attrs: desc.attrs.into_iter().collect(),
            text: desc.text,
            children: Vec::new(),
            parent,
            hidden: desc.hidden,
            checked: desc.checked,
            disabled: desc.disabled,
            value: String::new(),
            behavior: desc.behavior,
        };
        self.nodes.insert(id, node);
        let children: Vec<NodeId> = desc
            .children
            .into_iter()
            .map(|child| self.create(child, Some(id)))
            .collect();
        if let Some(node) = self.nodes.get_mut(&id) {
            node.children = children;
        }
        id
    }

    /// Append `desc` under `parent`, returning the new node.
    pub fn insert(&mut self, parent: NodeId, desc: El) -> NodeId {
        let id = self.create(desc, Some(parent));
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        id
    }

    /// Detach and drop every child of `parent`.
    pub fn clear_children(&mut self, parent: NodeId) {
        let children = match self.nodes.get_mut(&parent) {
            Some(p) => std::mem::take(&mut p.children),
            None => return,
        };
        for child in children {
            self.drop_subtree(child);
        }
    }

    fn drop_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            for child in node.children {
                self.drop_subtree(child);
            }
        }
    }

    /// Descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect(id, &mut out);
        out
    }

    fn collect(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if let Some(node) = self.nodes.get(&id) {
            for child in &node.children {
                out.push(*child);
                self.collect(*child, out);
            }
        }
    }

    /// Self first, then each parent up to the root.
    pub fn ancestors_inclusive(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            out.push(current);
            cursor = self.nodes.get(&current).and_then(|n| n.parent);
        }
        out
    }

    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.push_text(id, &mut out);
        out
    }

    fn push_text(&self, id: NodeId, out: &mut String) {
        if let Some(node) = self.nodes.get(&id) {
            out.push_str(&node.text);
            for child in &node.children {
                self.push_text(*child, out);
            }
        }
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        self.ancestors_inclusive(id)
            .iter()
            .all(|a| self.nodes.get(a).map_or(false, |n| !n.hidden))
    }

    /// Nodes under `scope` matching `selector`, in document order.
    pub fn select(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        let Some((last, outer)) = selector.chain.split_last() else {
            return Vec::new();
        };
        self.descendants(scope)
            .into_iter()
            .filter(|id| {
                let Some(node) = self.nodes.get(id) else {
                    return false;
                };
                if !node.matches(last) {
                    return false;
                }
                // Match the outer compounds right to left among ancestors inside the scope
                let mut remaining = outer.iter().rev().peekable();
                let mut cursor = node.parent;
                while let (Some(compound), Some(current)) = (remaining.peek(), cursor) {
                    if current == scope {
                        break;
                    }
                    let Some(ancestor) = self.nodes.get(&current) else {
                        break;
                    };
                    if ancestor.matches(compound) {
                        remaining.next();
                    }
                    cursor = ancestor.parent;
                }
                remaining.peek().is_none()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::selector::parse;

    fn table() -> (Dom, NodeId) {
        let mut dom = Dom::new();
        let root = dom.root();
        let table = dom.insert(
            root,
            el("table")
                .child(el("thead").child(el("tr").child(el("th").child(
                    el("input").attr("placeholder", "Age"),
                ))))
                .child(
                    el("tbody")
                        .child(el("tr").child(el("td").text("1")).child(el("td").text("Mark")))
                        .child(el("tr").child(el("td").text("2")).child(el("td").text("Jacob"))),
                ),
        );
        (dom, table)
    }

    #[test]
    fn test_select_descendant_chain() {
        let (dom, _) = table();
        let rows = dom.select(dom.root(), &parse("tbody tr").unwrap());
        assert_eq!(rows.len(), 2);
        let input = dom.select(dom.root(), &parse(r#"thead input[placeholder="Age"]"#).unwrap());
        assert_eq!(input.len(), 1);
        assert!(dom.select(dom.root(), &parse("tbody input").unwrap()).is_empty());
    }

    #[test]
    fn test_select_is_scoped() {
        let (dom, _) = table();
        let rows = dom.select(dom.root(), &parse("tbody tr").unwrap());
        let cells = dom.select(rows[1], &parse("td").unwrap());
        assert_eq!(cells.len(), 2);
        assert_eq!(dom.text_content(cells[1]), "Jacob");
        // the outer compound must itself sit inside the scope
        assert!(dom.select(rows[1], &parse("tbody td").unwrap()).is_empty());
    }

    #[test]
    fn test_text_content_concatenates() {
        let (dom, table) = table();
        assert_eq!(dom.text_content(table), "1Mark2Jacob");
    }

    #[test]
    fn test_cleared_nodes_disappear() {
        let (mut dom, _) = table();
        let tbody = dom.select(dom.root(), &parse("tbody").unwrap())[0];
        let rows = dom.select(tbody, &parse("tr").unwrap());
        dom.clear_children(tbody);
        assert!(dom.get(rows[0]).is_none());
        assert!(dom.get(tbody).is_some());
    }

    #[test]
    fn test_hidden_ancestor_hides_descendants() {
        let mut dom = Dom::new();
        let root = dom.root();
        let list = dom.insert(root, el("ul").hidden(true).child(el("li").text("Dark")));
        let item = dom.descendants(list)[0];
        assert!(!dom.is_visible(item));
        dom.get_mut(list).unwrap().hidden = false;
        assert!(dom.is_visible(item));
    }

    #[test]
    fn test_plain_elements_are_inert() {
        let mut dom = Dom::new();
        let root = dom.root();
        let button = dom.insert(
            root,
            el("button").child(el("span").on(Behavior::ThemeSelect)),
        );
        let span = dom.descendants(button)[0];
        assert_eq!(dom.get(button).unwrap().behavior, Behavior::Inert);
        assert_eq!(dom.get(span).unwrap().behavior, Behavior::ThemeSelect);
    }
}
