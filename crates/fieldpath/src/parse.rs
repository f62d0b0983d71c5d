use crate::{path::PathBuf, Element};
use peg::str::LineCol;

pub type ParseError = peg::error::ParseError<LineCol>;

peg::parser! {
    pub grammar parser() for str {
        rule plain_field() -> Element
            = "." name:$((!['.' | '\n' | '[' | '"'][_])+) {
                Element::Field(name.to_owned())
            }
        rule quoted_char() -> char
            = "\\\"" { '"' }
            / !"\"" c:[_] { c }
        rule quoted_field() -> Element
            = ".\"" name:quoted_char()* "\"" {
                Element::Field(name.into_iter().collect())
            }
        rule index() -> Element
            = "[" idx:$(['0'..='9']+) "]" {?
                idx.parse().map(Element::Index).or(Err("index"))
            }
        rule element() -> Element
            = quoted_field()
            / plain_field()
            / index()

        pub rule path() -> PathBuf
            = path:element()+ { PathBuf(path) }
    }
}

/// Parses paths in the form printed by `PathBuf`'s `Display`,
/// e.g. `.metadata.labels."app.kubernetes.io/name"` or `.items[0].kind`
pub fn parse(input: &str) -> Result<PathBuf, ParseError> {
    parser::path(input)
}

#[cfg(test)]
mod tests {
    use super::parse;
    use crate::{Element::*, PathBuf};

    #[test]
    fn plain() {
        assert_eq!(
            parse(".metadata.namespace").unwrap(),
            PathBuf(vec![
                Field("metadata".to_owned()),
                Field("namespace".to_owned())
            ])
        );
    }

    #[test]
    fn quoted_and_index() {
        assert_eq!(
            parse(r#".items[2].metadata.labels."app.kubernetes.io/name""#).unwrap(),
            PathBuf(vec![
                Field("items".to_owned()),
                Index(2),
                Field("metadata".to_owned()),
                Field("labels".to_owned()),
                Field("app.kubernetes.io/name".to_owned()),
            ])
        );
    }

    #[test]
    fn display_parses_back() {
        let path = PathBuf(vec![
            Field("metadata".to_owned()),
            Field("annotations".to_owned()),
            Field("say \"hi\".now".to_owned()),
            Index(0),
        ]);
        assert_eq!(parse(&path.to_string()).unwrap(), path);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("metadata").is_err());
        assert!(parse("").is_err());
        assert!(parse(".a[x]").is_err());
    }
}
