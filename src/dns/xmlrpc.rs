//! Minimal XML-RPC codec.
//!
//! Covers what the Loopia API exchanges: scalar values, arrays and structs
//! inside `methodCall` requests and `methodResponse` replies (including
//! faults).

use std::collections::BTreeMap;
use std::fmt::Write as _;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{Result, UpdateError};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
    Double(f64),
    DateTime(String),
    Base64(String),
    Array(Vec<Value>),
    Struct(BTreeMap<String, Value>),
    Nil,
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<value>");
        match self {
            Value::String(s) => {
                let _ = write!(out, "<string>{}</string>", escape(s.as_str()));
            }
            Value::Int(i) => {
                let _ = write!(out, "<int>{i}</int>");
            }
            Value::Bool(b) => {
                let _ = write!(out, "<boolean>{}</boolean>", u8::from(*b));
            }
            Value::Double(d) => {
                let _ = write!(out, "<double>{d}</double>");
            }
            Value::DateTime(s) => {
                let _ = write!(out, "<dateTime.iso8601>{}</dateTime.iso8601>", escape(s.as_str()));
            }
            Value::Base64(s) => {
                let _ = write!(out, "<base64>{}</base64>", escape(s.as_str()));
            }
            Value::Array(items) => {
                out.push_str("<array><data>");
                for item in items {
                    item.write_xml(out);
                }
                out.push_str("</data></array>");
            }
            Value::Struct(members) => {
                out.push_str("<struct>");
                for (name, value) in members {
                    let _ = write!(out, "<member><name>{}</name>", escape(name.as_str()));
                    value.write_xml(out);
                    out.push_str("</member>");
                }
                out.push_str("</struct>");
            }
            Value::Nil => out.push_str("<nil/>"),
        }
        out.push_str("</value>");
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// Render a `methodCall` document.
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
    let _ = write!(out, "<methodCall><methodName>{}</methodName><params>", escape(method));
    for param in params {
        out.push_str("<param>");
        param.write_xml(&mut out);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

/// Parse a `methodResponse` document into its single return value.
///
/// A `<fault>` response is turned into [`UpdateError::RemoteApi`].
pub fn decode_response(xml: &str) -> Result<Value> {
    let mut parser = Parser::new(xml);
    parser.expect_open("methodResponse")?;

    match parser.next_significant()? {
        Token::Open(name) if name == "params" => {
            parser.expect_open("param")?;
            let value = match parser.next_significant()? {
                Token::Open(name) if name == "value" => parser.value_body()?,
                Token::Empty(name) if name == "value" => Value::String(String::new()),
                other => return Err(malformed(format!("expected <value>, found {other:?}"))),
            };
            parser.expect_close("param")?;
            parser.expect_close("params")?;
            Ok(value)
        }
        Token::Open(name) if name == "fault" => {
            parser.expect_open("value")?;
            let fault = parser.value_body()?;
            Err(fault_error(&fault))
        }
        other => Err(malformed(format!("unexpected {other:?} in methodResponse"))),
    }
}

fn fault_error(fault: &Value) -> UpdateError {
    let (code, message) = match fault {
        Value::Struct(members) => (
            match members.get("faultCode") {
                Some(Value::Int(code)) => *code,
                _ => 0,
            },
            members
                .get("faultString")
                .and_then(Value::as_str)
                .unwrap_or("unknown fault")
                .to_string(),
        ),
        _ => (0, "unknown fault".to_string()),
    };
    UpdateError::remote(format!("XML-RPC fault {code}: {message}"))
}

fn malformed(detail: impl std::fmt::Display) -> UpdateError {
    UpdateError::remote(format!("malformed XML-RPC response: {detail}"))
}

#[derive(Debug)]
enum Token {
    Open(String),
    Close(String),
    Empty(String),
    Text(String),
    Eof,
}

struct Parser<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> Parser<'a> {
    fn new(xml: &'a str) -> Self {
        Self {
            reader: Reader::from_str(xml),
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        loop {
            let event = self.reader.read_event().map_err(malformed)?;
            return Ok(match event {
                Event::Start(e) => Token::Open(tag_name(e.local_name().as_ref())),
                Event::End(e) => Token::Close(tag_name(e.local_name().as_ref())),
                Event::Empty(e) => Token::Empty(tag_name(e.local_name().as_ref())),
                Event::Text(t) => Token::Text(t.unescape().map_err(malformed)?.into_owned()),
                Event::CData(c) => Token::Text(String::from_utf8_lossy(&c.into_inner()).into_owned()),
                Event::Eof => Token::Eof,
                _ => continue,
            });
        }
    }

    /// Next token that is not inter-element whitespace.
    fn next_significant(&mut self) -> Result<Token> {
        loop {
            match self.next_token()? {
                Token::Text(t) if t.trim().is_empty() => continue,
                token => return Ok(token),
            }
        }
    }

    fn expect_open(&mut self, expected: &str) -> Result<()> {
        match self.next_significant()? {
            Token::Open(name) if name == expected => Ok(()),
            other => Err(malformed(format!("expected <{expected}>, found {other:?}"))),
        }
    }

    fn expect_close(&mut self, expected: &str) -> Result<()> {
        match self.next_significant()? {
            Token::Close(name) if name == expected => Ok(()),
            other => Err(malformed(format!("expected </{expected}>, found {other:?}"))),
        }
    }

    /// Text content up to the closing tag, which is consumed.
    fn text_until_close(&mut self, tag: &str) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.next_token()? {
                Token::Text(t) => text.push_str(&t),
                Token::Close(name) if name == tag => return Ok(text),
                other => return Err(malformed(format!("unexpected {other:?} inside <{tag}>"))),
            }
        }
    }

    /// Contents of a `<value>` whose opening tag was already consumed.
    fn value_body(&mut self) -> Result<Value> {
        let mut text = String::new();
        loop {
            match self.next_token()? {
                Token::Text(t) => text.push_str(&t),
                // Untyped values are strings.
                Token::Close(name) if name == "value" => return Ok(Value::String(text)),
                Token::Empty(name) => {
                    let value = empty_value(&name)?;
                    self.expect_close("value")?;
                    return Ok(value);
                }
                Token::Open(name) => {
                    let value = self.typed_value(&name)?;
                    self.expect_close("value")?;
                    return Ok(value);
                }
                other => return Err(malformed(format!("unexpected {other:?} inside <value>"))),
            }
        }
    }

    fn typed_value(&mut self, tag: &str) -> Result<Value> {
        match tag {
            "string" => Ok(Value::String(self.text_until_close(tag)?)),
            "int" | "i4" | "i8" => {
                let text = self.text_until_close(tag)?;
                text.trim()
                    .parse()
                    .map(Value::Int)
                    .map_err(|_| malformed(format!("invalid integer {text:?}")))
            }
            "boolean" => match self.text_until_close(tag)?.trim() {
                "1" => Ok(Value::Bool(true)),
                "0" => Ok(Value::Bool(false)),
                other => Err(malformed(format!("invalid boolean {other:?}"))),
            },
            "double" => {
                let text = self.text_until_close(tag)?;
                text.trim()
                    .parse()
                    .map(Value::Double)
                    .map_err(|_| malformed(format!("invalid double {text:?}")))
            }
            "dateTime.iso8601" => Ok(Value::DateTime(self.text_until_close(tag)?)),
            "base64" => Ok(Value::Base64(self.text_until_close(tag)?)),
            "nil" => {
                self.expect_close(tag)?;
                Ok(Value::Nil)
            }
            "array" => self.array_body(),
            "struct" => self.struct_body(),
            other => Err(malformed(format!("unknown value type <{other}>"))),
        }
    }

    fn array_body(&mut self) -> Result<Value> {
        let mut items = Vec::new();
        match self.next_significant()? {
            Token::Empty(name) if name == "data" => {}
            Token::Open(name) if name == "data" => loop {
                match self.next_significant()? {
                    Token::Open(name) if name == "value" => items.push(self.value_body()?),
                    Token::Empty(name) if name == "value" => items.push(Value::String(String::new())),
                    Token::Close(name) if name == "data" => break,
                    other => return Err(malformed(format!("unexpected {other:?} inside <data>"))),
                }
            },
            other => return Err(malformed(format!("expected <data>, found {other:?}"))),
        }
        self.expect_close("array")?;
        Ok(Value::Array(items))
    }

    fn struct_body(&mut self) -> Result<Value> {
        let mut members = BTreeMap::new();
        loop {
            match self.next_significant()? {
                Token::Open(name) if name == "member" => {
                    self.expect_open("name")?;
                    let key = self.text_until_close("name")?;
                    let value = match self.next_significant()? {
                        Token::Open(name) if name == "value" => self.value_body()?,
                        Token::Empty(name) if name == "value" => Value::String(String::new()),
                        other => {
                            return Err(malformed(format!("expected member value, found {other:?}")))
                        }
                    };
                    self.expect_close("member")?;
                    members.insert(key, value);
                }
                Token::Close(name) if name == "struct" => return Ok(Value::Struct(members)),
                other => return Err(malformed(format!("unexpected {other:?} inside <struct>"))),
            }
        }
    }
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn empty_value(tag: &str) -> Result<Value> {
    match tag {
        "string" => Ok(Value::String(String::new())),
        "nil" => Ok(Value::Nil),
        "array" => Ok(Value::Array(Vec::new())),
        "struct" => Ok(Value::Struct(BTreeMap::new())),
        other => Err(malformed(format!("empty <{other}/> has no value"))),
    }
}
