//! Parser for VWF files.

use super::ast::*;
use super::lexer::{Lexer, Token, TokenKind};
use crate::error::{Result, VwfError};

/// Where a stanza is being parsed; decides which stanzas are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    /// Directly inside a section other than TRANSITION_LIST
    Section,
    /// Directly inside TRANSITION_LIST
    TransitionList,
    /// Inside a NODE block
    Node,
}

/// Deepest `NODE` nesting accepted inside a transition list.
pub const MAX_NODE_DEPTH: usize = 64;

/// Recursive-descent parser for VWF files.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    node_depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            node_depth: 0,
        })
    }

    /// Parse the entire file.
    pub fn parse(&mut self) -> Result<VwfAst> {
        let mut ast = VwfAst::default();

        loop {
            match self.current.kind {
                TokenKind::Eof => break,
                TokenKind::Semicolon => {
                    // Terminating semicolon; nothing may follow it
                    self.advance()?;
                    if self.current.kind != TokenKind::Eof {
                        return Err(self.error("expected end of file after ';'"));
                    }
                    break;
                }
                TokenKind::Identifier => {
                    let section = self.parse_section()?;
                    ast.sections.push(section);
                }
                _ => return Err(self.error("expected a section keyword")),
            }
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn error(&self, message: impl Into<String>) -> VwfError {
        let token = if self.current.kind == TokenKind::Eof {
            "<eof>".to_string()
        } else {
            self.current.text.clone()
        };
        VwfError::parse(self.current.line, self.current.column, token, message)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.current.kind == kind {
            let tok = self.current.clone();
            self.advance()?;
            Ok(tok)
        } else {
            Err(self.error(format!("expected {:?}, got {:?}", kind, self.current.kind)))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.current.kind == TokenKind::Identifier && self.current.text == keyword {
            self.advance()
        } else {
            Err(self.error(format!("expected '{}'", keyword)))
        }
    }

    fn parse_section(&mut self) -> Result<Section> {
        let line = self.current.line;
        let kind = SectionKind::from_keyword(&self.current.text)
            .ok_or_else(|| self.error("unknown section keyword"))?;
        self.advance()?;

        let index = if self.current.kind == TokenKind::OpenParen {
            self.advance()?;
            let literal = self.parse_literal()?;
            self.expect(TokenKind::CloseParen)?;
            Some(literal)
        } else {
            None
        };

        let context = if kind == SectionKind::TransitionList {
            Context::TransitionList
        } else {
            Context::Section
        };
        let body = self.parse_block_body(context)?;

        Ok(Section {
            kind,
            index,
            body,
            line,
        })
    }

    /// Parse `{ stanza* }`.
    fn parse_block_body(&mut self, context: Context) -> Result<Vec<Stanza>> {
        self.expect(TokenKind::OpenBrace)?;
        let mut body = Vec::new();

        loop {
            match self.current.kind {
                TokenKind::CloseBrace => {
                    self.advance()?;
                    return Ok(body);
                }
                TokenKind::Eof => return Err(self.error("unbalanced '{': missing '}'")),
                TokenKind::Identifier => body.push(self.parse_stanza(context)?),
                _ => return Err(self.error("expected an attribute, NODE or LEVEL")),
            }
        }
    }

    fn parse_stanza(&mut self, context: Context) -> Result<Stanza> {
        let line = self.current.line;

        match self.current.text.as_str() {
            "NODE" if context != Context::Section => {
                if self.node_depth >= MAX_NODE_DEPTH {
                    return Err(self.error(format!("NODE blocks nested deeper than {}", MAX_NODE_DEPTH)));
                }
                self.advance()?;
                self.node_depth += 1;
                let body = self.parse_block_body(Context::Node);
                self.node_depth -= 1;
                Ok(Stanza::Node(NodeBlock { body: body?, line }))
            }
            "NODE" => Err(self.error("NODE block outside a transition list")),
            "LEVEL" if context == Context::Node => {
                self.advance()?;
                let value = self.parse_literal()?;
                self.expect_keyword("FOR")?;
                let duration = self.expect(TokenKind::Number)?.text;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stanza::Level(LevelStatement {
                    value,
                    duration,
                    line,
                }))
            }
            "LEVEL" => Err(self.error("LEVEL statement outside a NODE block")),
            _ if SectionKind::from_keyword(&self.current.text).is_some() => {
                Err(self.error("unbalanced section: previous section is missing '}'"))
            }
            _ => {
                let key = self.expect(TokenKind::Identifier)?.text;
                if self.current.kind != TokenKind::Equals {
                    return Err(self.error(format!("unknown block keyword '{}'", key)));
                }
                self.advance()?;
                let mut values = vec![self.parse_literal()?];
                while self.current.kind == TokenKind::Comma {
                    self.advance()?;
                    values.push(self.parse_literal()?);
                }
                self.expect(TokenKind::Semicolon)?;
                Ok(Stanza::Assignment(Assignment { key, values, line }))
            }
        }
    }

    fn parse_literal(&mut self) -> Result<Literal> {
        let literal = match self.current.kind {
            TokenKind::String => Literal::Str(self.current.text.clone()),
            TokenKind::Number => Literal::Number(self.current.text.clone()),
            TokenKind::Identifier => Literal::Ident(self.current.text.clone()),
            _ => return Err(self.error("expected a value")),
        };
        self.advance()?;
        Ok(literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<VwfAst> {
        super::super::parse(input)
    }

    #[test]
    fn test_parse_header() {
        let input = "HEADER\n{\n\tVERSION = 1;\n\tTIME_UNIT = ns;\n\tGRID_PERIOD = 10.0;\n}\n;";
        let ast = parse(input).unwrap();
        assert_eq!(ast.sections.len(), 1);
        let header = &ast.sections[0];
        assert_eq!(header.kind, SectionKind::Header);
        assert!(header.index.is_none());
        assert_eq!(header.body.len(), 3);
        match &header.body[1] {
            Stanza::Assignment(a) => {
                assert_eq!(a.key, "TIME_UNIT");
                assert_eq!(a.values, vec![Literal::Ident("ns".to_string())]);
                assert_eq!(a.line, 4);
            }
            other => panic!("unexpected stanza {:?}", other),
        }
    }

    #[test]
    fn test_parse_transition_list() {
        let input = r#"
TRANSITION_LIST("clk")
{
    NODE
    {
        REPEAT = 1;
        NODE
        {
            REPEAT = 3;
            LEVEL 0 FOR 10.0;
            LEVEL 1 FOR 10.0;
        }
        LEVEL X FOR 5.5;
    }
}
"#;
        let ast = parse(input).unwrap();
        let list = &ast.sections[0];
        assert_eq!(list.kind, SectionKind::TransitionList);
        assert_eq!(list.index, Some(Literal::Str("clk".to_string())));
        let outer = match &list.body[0] {
            Stanza::Node(n) => n,
            other => panic!("unexpected stanza {:?}", other),
        };
        assert_eq!(outer.body.len(), 3);
        match &outer.body[2] {
            Stanza::Level(level) => {
                assert_eq!(level.value, Literal::Ident("X".to_string()));
                assert_eq!(level.duration, "5.5");
            }
            other => panic!("unexpected stanza {:?}", other),
        }
    }

    #[test]
    fn test_parse_list_assignment() {
        let input = "DISPLAY_LINE { CHANNEL = \"d\"; CHILDREN = 2, 3, 4; }";
        let ast = parse(input).unwrap();
        match &ast.sections[0].body[1] {
            Stanza::Assignment(a) => assert_eq!(a.values.len(), 3),
            other => panic!("unexpected stanza {:?}", other),
        }
    }

    #[test]
    fn test_unknown_section_is_fatal() {
        let err = parse("FOOTER { }").unwrap_err();
        match err {
            VwfError::ParseError { line, column, token, .. } => {
                assert_eq!((line, column), (1, 1));
                assert_eq!(token, "FOOTER");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_unbalanced_braces_are_fatal() {
        assert!(matches!(
            parse("HEADER { VERSION = 1;").unwrap_err(),
            VwfError::ParseError { .. }
        ));
        assert!(matches!(
            parse("HEADER { VERSION = 1; SIGNAL(\"a\") { }").unwrap_err(),
            VwfError::ParseError { .. }
        ));
        assert!(matches!(
            parse("HEADER { } }").unwrap_err(),
            VwfError::ParseError { .. }
        ));
    }

    #[test]
    fn test_level_outside_node_is_fatal() {
        let err = parse("TRANSITION_LIST(\"a\") { LEVEL 0 FOR 1.0; }").unwrap_err();
        assert!(matches!(err, VwfError::ParseError { .. }));
        let err = parse("SIGNAL(\"a\") { NODE { } }").unwrap_err();
        assert!(matches!(err, VwfError::ParseError { .. }));
    }

    #[test]
    fn test_sections_in_any_order() {
        let input = "DISPLAY_LINE { } SIGNAL(\"a\") { } HEADER { }";
        let ast = parse(input).unwrap();
        assert_eq!(ast.sections.len(), 3);
        assert_eq!(ast.sections_of(SectionKind::Header).count(), 1);
    }

    #[test]
    fn test_trailing_content_after_terminator() {
        assert!(parse("HEADER { } ; HEADER { }").is_err());
    }

    #[test]
    fn test_node_nesting_limit() {
        let nested = |depth: usize| {
            format!(
                "TRANSITION_LIST(\"a\") {{ {} LEVEL 0 FOR 1.0; {} }}",
                "NODE { ".repeat(depth),
                "} ".repeat(depth)
            )
        };
        assert!(parse(&nested(MAX_NODE_DEPTH)).is_ok());

        let err = parse(&nested(100_000)).unwrap_err();
        assert!(matches!(err, VwfError::ParseError { ref token, .. } if token == "NODE"));
    }
}
