//! Host-level (JVM) types of fields, parameters and return values

use serde::{Deserialize, Serialize};
use std::fmt;

/// Malformed JVM descriptor text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed descriptor `{descriptor}`: {reason}")]
pub struct DescriptorError {
    /// The input
    pub descriptor: String,
    /// What went wrong
    pub reason: String,
}

/// A JVM type as the host compiler models it
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum JvmType {
    /// `void`, only valid as a return type
    Void,
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `char`
    Char,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
    /// A class or interface, by internal name (`java/lang/String`)
    Object(String),
    /// An array of the element type
    Array(Box<JvmType>),
    /// A type variable; erases to `bound`
    TypeVariable {
        /// Variable name
        name: String,
        /// Erasure (first bound, or `java/lang/Object`)
        bound: Box<JvmType>,
    },
}

impl JvmType {
    /// Reference type by internal or dotted name
    pub fn object(name: &str) -> Self {
        Self::Object(name.replace('.', "/"))
    }

    /// Array of `element`
    pub fn array(element: JvmType) -> Self {
        Self::Array(Box::new(element))
    }

    /// The erased type: type variables are replaced by their bound
    pub fn erased(&self) -> &JvmType {
        match self {
            Self::TypeVariable { bound, .. } => bound.erased(),
            other => other,
        }
    }

    /// Parse a single field descriptor such as `[Ljava/lang/String;`
    pub fn parse(descriptor: &str) -> Result<Self, DescriptorError> {
        let mut parser = DescriptorParser::new(descriptor);
        let ty = parser.parse_type()?;
        if parser.remaining() != 0 {
            return Err(parser.error("trailing characters"));
        }
        Ok(ty)
    }

    /// Parse a method descriptor such as `(IJ)V` into parameter and return types
    pub fn parse_method(descriptor: &str) -> Result<(Vec<Self>, Self), DescriptorError> {
        let mut parser = DescriptorParser::new(descriptor);
        parser.expect(b'(')?;
        let mut params = Vec::new();
        while !parser.peek(b')')? {
            params.push(parser.parse_type()?);
        }
        parser.expect(b')')?;
        let ret = if parser.peek(b'V')? {
            parser.pos += 1;
            Self::Void
        } else {
            parser.parse_type()?
        };
        if parser.remaining() != 0 {
            return Err(parser.error("trailing characters"));
        }
        Ok((params, ret))
    }
}

impl fmt::Display for JvmType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => formatter.write_str("void"),
            Self::Boolean => formatter.write_str("boolean"),
            Self::Byte => formatter.write_str("byte"),
            Self::Char => formatter.write_str("char"),
            Self::Short => formatter.write_str("short"),
            Self::Int => formatter.write_str("int"),
            Self::Long => formatter.write_str("long"),
            Self::Float => formatter.write_str("float"),
            Self::Double => formatter.write_str("double"),
            Self::Object(name) => formatter.write_str(&name.replace('/', ".")),
            Self::Array(element) => write!(formatter, "{element}[]"),
            Self::TypeVariable { name, .. } => formatter.write_str(name),
        }
    }
}

struct DescriptorParser<'src> {
    text: &'src str,
    bytes: &'src [u8],
    pos: usize,
}

impl<'src> DescriptorParser<'src> {
    fn new(text: &'src str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, reason: &str) -> DescriptorError {
        DescriptorError {
            descriptor: self.text.to_owned(),
            reason: reason.to_owned(),
        }
    }

    fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    fn peek(&self, expected: u8) -> Result<bool, DescriptorError> {
        match self.bytes.get(self.pos) {
            Some(&byte) => Ok(byte == expected),
            None => Err(self.error("unexpected end")),
        }
    }

    fn expect(&mut self, expected: u8) -> Result<(), DescriptorError> {
        if self.peek(expected)? {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", expected as char)))
        }
    }

    fn parse_type(&mut self) -> Result<JvmType, DescriptorError> {
        let Some(&tag) = self.bytes.get(self.pos) else {
            return Err(self.error("unexpected end"));
        };
        self.pos += 1;
        let ty = match tag {
            b'Z' => JvmType::Boolean,
            b'B' => JvmType::Byte,
            b'C' => JvmType::Char,
            b'S' => JvmType::Short,
            b'I' => JvmType::Int,
            b'J' => JvmType::Long,
            b'F' => JvmType::Float,
            b'D' => JvmType::Double,
            b'[' => JvmType::Array(Box::new(self.parse_type()?)),
            b'L' => {
                let start = self.pos;
                while self.bytes.get(self.pos).is_some_and(|&byte| byte != b';') {
                    self.pos += 1;
                }
                if self.pos >= self.bytes.len() {
                    return Err(self.error("unterminated reference type"));
                }
                let name = &self.text[start..self.pos];
                self.pos += 1;
                JvmType::Object(name.to_owned())
            }
            other => {
                return Err(self.error(&format!("unexpected tag '{}'", other as char)));
            }
        };
        Ok(ty)
    }
}
