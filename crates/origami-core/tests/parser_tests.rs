use origami_core::syntax::{AstNode, Element, SyntaxKind, parse_document};

const DOCUMENT: &str = r#"import {Layout} from "./layout.jsx";

export function Page(props) {
  const items = props.items ?? [];
  return (
    <Layout title="Demo">
      <h1>Items {items.length}</h1>
      <$for var="item" of={items}>
        <li>{item.name}</li>
      </$for>
    </Layout>
  );
}
"#;

#[test]
fn parses_a_realistic_document_losslessly() {
    let (root, errors) = parse_document(DOCUMENT);
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(root.text().to_string(), DOCUMENT);
}

#[test]
fn finds_the_reserved_element_with_its_attributes() {
    let (root, _) = parse_document(DOCUMENT);
    let element = root
        .descendants()
        .filter_map(Element::cast)
        .find(|e| e.tag_name().as_deref() == Some("$for"))
        .expect("$for element");

    let opening = element.opening_tag().expect("opening tag");
    let names: Vec<_> = opening.attributes().filter_map(|a| a.name()).collect();
    assert_eq!(names, vec!["var", "of"]);
    assert!(element.has_body_content());
    assert!(element.closing_tag().is_some());
}

#[test]
fn spans_nest_strictly() {
    let (root, _) = parse_document(DOCUMENT);
    for element in root.descendants().filter_map(Element::cast) {
        let span = element.span();
        if let Some(opening) = element.opening_tag() {
            let open = opening.span();
            assert!(span.start <= open.start && open.end <= span.end);
        }
        if let Some(closing) = element.closing_tag() {
            let close = closing.span();
            assert!(span.start <= close.start && close.end <= span.end);
        }
    }
}

#[test]
fn sibling_spans_do_not_overlap() {
    let (root, _) = parse_document(DOCUMENT);
    for node in root.descendants() {
        let mut prev_end = None;
        for child in node.children() {
            let start = u32::from(child.text_range().start());
            if let Some(end) = prev_end {
                assert!(start >= end, "overlapping siblings in {:?}", node.kind());
            }
            prev_end = Some(u32::from(child.text_range().end()));
        }
    }
}

#[test]
fn empty_input_parses_to_an_empty_document() {
    let (root, errors) = parse_document("");
    assert!(errors.is_empty());
    assert_eq!(root.kind(), SyntaxKind::Document);
    assert_eq!(root.text().to_string(), "");
}

#[test]
fn markdown_ish_prose_survives() {
    let source = "<p>it's fine, really: {\"quoted\"} & more</p>";
    let (root, errors) = parse_document(source);
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(root.text().to_string(), source);
}

#[test]
fn unterminated_container_is_reported_but_lossless() {
    let source = "<p>{broken</p>";
    let (root, errors) = parse_document(source);
    assert!(!errors.is_empty());
    assert_eq!(root.text().to_string(), source);
}
