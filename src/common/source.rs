use std::rc::Rc;

/// `Source` represents the text of one template entry,
/// after rule expansion has been applied.
/// It's essentially a string with a name, the name being
/// the entry the text was compiled for. Sources without
/// an entry name are called `source`.
#[derive(Debug, PartialEq, Eq)]
pub struct Source {
    pub contents: String,
    pub name: String,
}

impl Source {
    /// Creates a new `Source` given both the text and the
    /// name of the entry it belongs to.
    pub fn new(contents: &str, name: &str) -> Rc<Source> {
        Rc::new(Source {
            contents: contents.to_string(),
            name: name.to_string(),
        })
    }

    /// Build an anonymous `Source` containing just a string.
    /// Note that this source will be called `source`.
    pub fn source(contents: &str) -> Rc<Source> {
        Source::new(contents, "source")
    }
}
