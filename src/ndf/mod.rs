/// Loading descriptor trees produced by the external grammar parser
pub mod parser;

use serde::Deserialize;
use serde::Serialize;
use variantly::Variantly;

/// One node of a parsed descriptor file.
///
/// Trees are immutable once loaded. Everything the resolvers know about a
/// descriptor comes from [`Node::find_first`] and [`Node::find_all`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Variantly)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Object(Object),
    Constant(Constant),
    List(Vec<Node>),
    Tuple(Vec<Node>),
    /// Any scalar token: numbers, strings, enum tokens, `~/` and `$/` paths.
    Literal(String),
}

/// `Name is TType ( Member = value ... )`. Anonymous when nested.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Object {
    #[serde(default)]
    pub name: Option<String>,
    pub type_name: String,
    #[serde(default)]
    pub members: Vec<Member>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub value: Node,
}

/// Top-level `name is value` where the value is not an object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    pub name: String,
    pub value: Box<Node>,
}

impl Node {
    pub fn scalar(text: impl Into<String>) -> Node {
        Node::Literal(text.into())
    }

    pub fn new_object<'a>(type_name: &str, members: impl IntoIterator<Item = (&'a str, Node)>) -> Node {
        Node::Object(Object {
            name: None,
            type_name: type_name.to_string(),
            members: members
                .into_iter()
                .map(|(name, value)| Member {
                    name: name.to_string(),
                    value,
                })
                .collect(),
        })
    }

    pub fn named_object<'a>(
        name: &str,
        type_name: &str,
        members: impl IntoIterator<Item = (&'a str, Node)>,
    ) -> Node {
        let mut node = Node::new_object(type_name, members);
        if let Node::Object(object) = &mut node {
            object.name = Some(name.to_string());
        }
        node
    }

    pub fn new_list(items: impl IntoIterator<Item = Node>) -> Node {
        Node::List(items.into_iter().collect())
    }

    pub fn new_tuple(items: impl IntoIterator<Item = Node>) -> Node {
        Node::Tuple(items.into_iter().collect())
    }

    pub fn new_constant(name: &str, value: Node) -> Node {
        Node::Constant(Constant {
            name: name.to_string(),
            value: Box::new(value),
        })
    }

    /// Descriptor name of a top-level object or constant.
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Object(object) => object.name.as_deref(),
            Node::Constant(constant) => Some(&constant.name),
            _ => None,
        }
    }

    pub fn type_name(&self) -> Option<&str> {
        self.object_ref().map(|object| object.type_name.as_str())
    }

    /// The raw text of a literal.
    pub fn text(&self) -> Option<&str> {
        self.literal_ref().map(String::as_str)
    }

    /// Parses a literal as a number, see [`parse_number`].
    pub fn number(&self) -> Option<f64> {
        self.text().and_then(parse_number)
    }

    /// Items of a list or tuple, empty for anything else.
    pub fn items(&self) -> &[Node] {
        match self {
            Node::List(items) | Node::Tuple(items) => items,
            _ => &[],
        }
    }

    pub fn members(&self) -> &[Member] {
        match self {
            Node::Object(object) => &object.members,
            _ => &[],
        }
    }

    /// Direct member lookup, no recursion.
    pub fn member(&self, name: &str) -> Option<&Node> {
        self.members()
            .iter()
            .find(|member| member.name == name)
            .map(|member| &member.value)
    }

    /// First child value: the first member of an object, first item of a
    /// list or tuple, or the value of a constant.
    pub fn first_value(&self) -> Option<&Node> {
        match self {
            Node::Object(object) => object.members.first().map(|member| &member.value),
            Node::List(items) | Node::Tuple(items) => items.first(),
            Node::Constant(constant) => Some(&constant.value),
            Node::Literal(_) => None,
        }
    }

    /// Key/value entries of a map-like list. Items may be two-element tuples
    /// or alternate keys and values in a flat list.
    pub fn pairs(&self) -> Vec<(&Node, &Node)> {
        let items = self.items();
        if items.iter().all(|item| item.is_tuple()) {
            return items
                .iter()
                .filter_map(|tuple| match tuple.items() {
                    [key, value, ..] => Some((key, value)),
                    _ => None,
                })
                .collect();
        }
        items
            .chunks_exact(2)
            .map(|pair| (&pair[0], &pair[1]))
            .collect()
    }

    /// A blank literal or an empty list carries no value.
    pub fn is_blank(&self) -> bool {
        match self {
            Node::Literal(text) => text.trim().is_empty(),
            Node::List(items) | Node::Tuple(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Depth-first search for `key`, returning every match in pre-order.
    ///
    /// A member or constant whose name equals `key` yields its value, an
    /// object whose type name equals `key` yields the object itself and a
    /// literal equal to `key` yields the literal.
    pub fn find_all<'a>(&'a self, key: &str) -> Vec<&'a Node> {
        let mut found = Vec::new();
        self.collect(key, &mut |node| {
            found.push(node);
            false
        });
        found
    }

    /// First match of [`Node::find_all`], without walking the rest of the tree.
    pub fn find_first<'a>(&'a self, key: &str) -> Option<&'a Node> {
        let mut first = None;
        self.collect(key, &mut |node| {
            first = Some(node);
            true
        });
        first
    }

    /// Whether `key` appears anywhere in the tree, either as a search match
    /// or as the trailing token of a descriptor path.
    pub fn mentions(&self, key: &str) -> bool {
        if self.find_first(key).is_some() {
            return true;
        }
        self.any_literal(&|text| last_path_token(text) == key)
    }

    fn any_literal(&self, pred: &dyn Fn(&str) -> bool) -> bool {
        match self {
            Node::Literal(text) => pred(text),
            Node::Object(object) => object
                .members
                .iter()
                .any(|member| member.value.any_literal(pred)),
            Node::Constant(constant) => constant.value.any_literal(pred),
            Node::List(items) | Node::Tuple(items) => items.iter().any(|item| item.any_literal(pred)),
        }
    }

    /// Visits matches in pre-order until `visit` returns true.
    fn collect<'a>(&'a self, key: &str, visit: &mut dyn FnMut(&'a Node) -> bool) -> bool {
        match self {
            Node::Object(object) => {
                if object.type_name == key && visit(self) {
                    return true;
                }
                for member in &object.members {
                    if member.name == key && visit(&member.value) {
                        return true;
                    }
                    if member.value.collect(key, visit) {
                        return true;
                    }
                }
                false
            }
            Node::Constant(constant) => {
                if constant.name == key && visit(&constant.value) {
                    return true;
                }
                constant.value.collect(key, visit)
            }
            Node::List(items) | Node::Tuple(items) => {
                for item in items {
                    if item.collect(key, visit) {
                        return true;
                    }
                }
                false
            }
            Node::Literal(text) => text == key && visit(self),
        }
    }
}

/// Removes every round bracket and surrounding whitespace.
pub fn strip_brackets(raw: &str) -> &str {
    raw.trim().trim_start_matches('(').trim_end_matches(')').trim()
}

/// Removes single and double quotes.
pub fn strip_quotes(raw: &str) -> String {
    raw.chars().filter(|c| *c != '\'' && *c != '"').collect()
}

/// Trailing identifier of a descriptor path: `$/GFX/Weapon/Ammo_X` -> `Ammo_X`.
pub fn last_path_token(raw: &str) -> &str {
    raw.rsplit('/').next().unwrap_or(raw).trim()
}

/// Parses `"<number> * <unit>"`, `"(<number> * <unit>)"` or a bare number.
/// Only the left operand is kept. Unit scaling is the caller's concern.
pub fn parse_number(raw: &str) -> Option<f64> {
    let inner = strip_brackets(raw);
    let left = inner.split('*').next()?.trim();
    let left = strip_brackets(left);
    if left.is_empty() {
        return None;
    }
    left.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Reads `True`/`False` tokens.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim() {
        "True" | "true" => Some(true),
        "False" | "false" => Some(false),
        _ => None,
    }
}
