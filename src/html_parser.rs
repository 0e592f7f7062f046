//! Owned, mutable HTML tree: parse once, edit attributes through element handles,
//! serialize once.

use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

pub struct HtmlDocument {
    dom: RcDom,
}

/// Handle to an element inside an [`HtmlDocument`].
#[derive(Clone)]
pub struct Element {
    node: Handle,
}

fn each_element(node: &Handle, f: &mut dyn FnMut(&Handle)) {
    if let NodeData::Element { .. } = node.data {
        f(node)
    }
    for child in node.children.borrow().iter() {
        each_element(child, f)
    }
}

impl HtmlDocument {
    pub fn parse(markup: &str) -> Self {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(markup);
        Self { dom }
    }

    /// Elements with the given local name, in document order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<Element> {
        let mut found = Vec::new();
        each_element(&self.dom.document, &mut |node| {
            if let NodeData::Element { ref name, .. } = node.data {
                if &*name.local == tag {
                    found.push(Element { node: node.clone() });
                }
            }
        });
        found
    }

    pub fn to_html(&self) -> String {
        let document: SerializableHandle = self.dom.document.clone().into();
        let mut out = Vec::new();
        serialize(&mut out, &document, SerializeOpts::default())
            .expect("serializing into a Vec<u8> cannot fail");
        String::from_utf8_lossy(&out).into_owned()
    }
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<String> {
        match self.node.data {
            NodeData::Element { ref attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|attr| &*attr.name.local == name)
                .map(|attr| attr.value.to_string()),
            _ => None,
        }
    }

    /// Overwrite an existing attribute. Returns false if the element has no such attribute.
    pub fn set_attr(&self, name: &str, value: &str) -> bool {
        match self.node.data {
            NodeData::Element { ref attrs, .. } => {
                let mut attrs = attrs.borrow_mut();
                match attrs.iter_mut().find(|attr| &*attr.name.local == name) {
                    Some(attr) => {
                        attr.value = StrTendril::from_slice(value);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }
}
