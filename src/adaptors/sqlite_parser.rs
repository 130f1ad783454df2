//! Parser for the `CREATE TABLE` / `CREATE INDEX` text SQLite keeps in `sqlite_master`.
//!
//! Text is tokenized once, split into statements at top-level `;`, and each table
//! body is split into clauses at top-level commas. A clause is either a table
//! constraint (`PRIMARY KEY`, `UNIQUE`, `FOREIGN KEY`, `CHECK`, optionally named
//! through `CONSTRAINT <name>`) or a column definition whose modifiers may come in
//! any order.
//!
//! Unnamed keys get synthetic names: `pk_<table>`, `ux_<table>_<n>` and
//! `fk_<table>_<n>`, where `n` is the ordinal of the key among its kind.

use crate::adaptors::trait_def::quote_literal;
use crate::error::{Result, data_error};
use crate::naming::Naming;
use crate::schema::{Field, FieldType, Key, KeyType, Table};
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// Bare identifier or keyword
    Word(String),
    /// `"x"`, `` `x` `` or `[x]`
    Quoted(String),
    /// `'text'`, unescaped
    Literal(String),
    Number(String),
    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,
    Symbol(char),
}

impl Token {
    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) | Token::Number(w) => f.write_str(w),
            Token::Quoted(q) => write!(f, "\"{}\"", q.replace('"', "\"\"")),
            Token::Literal(s) => f.write_str(&quote_literal(s)),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
            Token::Semicolon => f.write_str(";"),
            Token::Dot => f.write_str("."),
            Token::Symbol(c) => write!(f, "{}", c),
        }
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            c if c.is_whitespace() => i += 1,
            '-' if next == Some('-') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if next == Some('*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            ';' => {
                tokens.push(Token::Semicolon);
                i += 1;
            }
            '\'' => {
                let (value, end) = quoted(&chars, i, '\'')?;
                tokens.push(Token::Literal(value));
                i = end;
            }
            '"' | '`' => {
                let (value, end) = quoted(&chars, i, c)?;
                tokens.push(Token::Quoted(value));
                i = end;
            }
            '[' => {
                let close = chars[i + 1..]
                    .iter()
                    .position(|&ch| ch == ']')
                    .ok_or_else(|| data_error("Unterminated [identifier]"))?;
                tokens.push(Token::Quoted(chars[i + 1..i + 1 + close].iter().collect()));
                i += close + 2;
            }
            c if c.is_ascii_digit()
                || (matches!(c, '-' | '+' | '.') && next.is_some_and(|n| n.is_ascii_digit())) =>
            {
                let start = i;
                i += 1;
                while i < chars.len() {
                    let ch = chars[i];
                    let exponent_sign =
                        matches!(ch, '+' | '-') && matches!(chars[i - 1], 'e' | 'E');
                    if ch.is_ascii_alphanumeric() || ch == '.' || exponent_sign {
                        i += 1;
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Number(chars[start..i].iter().collect()));
            }
            '.' => {
                tokens.push(Token::Dot);
                i += 1;
            }
            c if c.is_alphanumeric() || c == '_' || c == '$' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$')
                {
                    i += 1;
                }
                tokens.push(Token::Word(chars[start..i].iter().collect()));
            }
            other => {
                tokens.push(Token::Symbol(other));
                i += 1;
            }
        }
    }
    Ok(tokens)
}

/// Read a quoted run starting at `start`; a doubled quote is an escaped quote.
fn quoted(chars: &[char], start: usize, quote: char) -> Result<(String, usize)> {
    let mut value = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        if chars[i] == quote {
            if chars.get(i + 1) == Some(&quote) {
                value.push(quote);
                i += 2;
                continue;
            }
            return Ok((value, i + 1));
        }
        value.push(chars[i]);
        i += 1;
    }
    Err(data_error(format!("Unterminated {}quoted text", quote)))
}

/// Split at `separator` tokens outside parentheses
fn split_top_level<'t>(tokens: &'t [Token], separator: &Token) -> Vec<&'t [Token]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            t if depth == 0 && t == separator => {
                parts.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&tokens[start..]);
    parts
}

fn render(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut previous: Option<&Token> = None;
    for token in tokens {
        let glue = matches!(token, Token::RParen | Token::Comma | Token::Dot)
            || matches!(previous, None | Some(Token::LParen) | Some(Token::Dot))
            || (*token == Token::LParen && matches!(previous, Some(Token::Word(_))));
        if !glue {
            out.push(' ');
        }
        out.push_str(&token.to_string());
        previous = Some(token);
    }
    out
}

struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Cursor<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + offset)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        self.peek().is_some_and(|t| t.is_keyword(keyword))
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword))
        }
    }

    fn identifier(&mut self) -> Result<String> {
        match self.peek() {
            Some(Token::Word(s)) | Some(Token::Quoted(s)) | Some(Token::Literal(s)) => {
                self.pos += 1;
                Ok(s.clone())
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    /// `[schema.]name`, keeping only the name
    fn qualified_name(&mut self) -> Result<String> {
        let mut name = self.identifier()?;
        while self.peek() == Some(&Token::Dot) {
            self.pos += 1;
            name = self.identifier()?;
        }
        Ok(name)
    }

    /// Tokens between a `(` at the cursor and its matching `)`
    fn paren_group(&mut self) -> Result<&'t [Token]> {
        if self.peek() != Some(&Token::LParen) {
            return Err(self.unexpected("("));
        }
        let start = self.pos + 1;
        let mut depth = 0usize;
        while let Some(token) = self.next() {
            match token {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(&self.tokens[start..self.pos - 1]);
                    }
                }
                _ => {}
            }
        }
        Err(data_error(format!(
            "Unbalanced parentheses in {}",
            render(self.tokens)
        )))
    }

    fn unexpected(&self, wanted: &str) -> crate::error::Error {
        let found = self
            .peek()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "end of statement".to_string());
        data_error(format!(
            "Expected {} but found {} in {}",
            wanted,
            found,
            render(self.tokens)
        ))
    }
}

/// First identifier of every top-level item in a column list
fn column_list(group: &[Token]) -> Result<Vec<String>> {
    split_top_level(group, &Token::Comma)
        .into_iter()
        .map(|item| Cursor::new(item).identifier())
        .collect()
}

/// Words that end a column's type name
const COLUMN_KEYWORDS: &[&str] = &[
    "CONSTRAINT",
    "PRIMARY",
    "NOT",
    "NULL",
    "UNIQUE",
    "CHECK",
    "DEFAULT",
    "COLLATE",
    "REFERENCES",
    "GENERATED",
    "AS",
    "AUTOINCREMENT",
];

fn is_column_keyword(word: &str) -> bool {
    COLUMN_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word))
}

/// Map a declared type to a logical type; multi-word types fall back to their first word.
fn resolve_type(words: &[String]) -> Result<FieldType> {
    if words.is_empty() {
        return Ok(FieldType::Undefined);
    }
    FieldType::get_fieldtype(&words.join(" ")).or_else(|err| {
        if words.len() > 1 {
            FieldType::get_fieldtype(&words[0])
        } else {
            Err(err)
        }
    })
}

/// Skip `ON CONFLICT <x>` and `ON DELETE|UPDATE <action>` clauses
fn skip_on_clause(c: &mut Cursor<'_>) {
    if c.eat_keyword("CONFLICT") {
        c.next();
    } else if c.eat_keyword("DELETE") || c.eat_keyword("UPDATE") {
        // SET NULL, SET DEFAULT, NO ACTION, CASCADE, RESTRICT
        if !c.eat_keyword("SET") {
            c.eat_keyword("NO");
        }
        c.next();
    }
}

#[derive(Debug, PartialEq)]
enum StatementKind {
    CreateTable,
    CreateIndex,
    Other,
}

fn classify(statement: &[Token]) -> StatementKind {
    let mut c = Cursor::new(statement);
    if !c.eat_keyword("CREATE") {
        return StatementKind::Other;
    }
    if !c.eat_keyword("TEMP") {
        c.eat_keyword("TEMPORARY");
    }
    c.eat_keyword("UNIQUE");
    if c.peek_keyword("TABLE") {
        StatementKind::CreateTable
    } else if c.peek_keyword("INDEX") {
        StatementKind::CreateIndex
    } else {
        StatementKind::Other
    }
}

/// Accumulates one table while its clauses are parsed
struct TableBuilder<'n> {
    naming: &'n dyn Naming,
    table: Table,
    unique_count: usize,
    fk_count: usize,
}

impl<'n> TableBuilder<'n> {
    fn new(naming: &'n dyn Naming, name: &str) -> Self {
        Self {
            naming,
            table: Table::new(naming.string_to_name(name)),
            unique_count: 0,
            fk_count: 0,
        }
    }

    fn table_name(&self) -> String {
        self.table.name.raw().to_string()
    }

    fn set_pk(&mut self, name: Option<String>, fields: Vec<String>) -> Result<()> {
        if self.table.pk.is_some() {
            return Err(data_error(format!(
                "Table {} declares more than one primary key",
                self.table.name
            )));
        }
        let name = name.unwrap_or_else(|| format!("pk_{}", self.table_name()));
        self.table.pk = Some(Key::primary_key(self.naming.string_to_name(&name), fields));
        Ok(())
    }

    fn add_unique(&mut self, name: Option<String>, fields: Vec<String>) {
        self.unique_count += 1;
        let name =
            name.unwrap_or_else(|| format!("ux_{}_{}", self.table_name(), self.unique_count));
        self.table
            .keys
            .push(Key::new(self.naming.string_to_name(&name), KeyType::Unique, fields));
    }

    /// `REFERENCES <table> [(<columns>)]` with any trailing actions
    fn add_foreign_key(
        &mut self,
        name: Option<String>,
        fields: Vec<String>,
        c: &mut Cursor<'_>,
    ) -> Result<()> {
        let primary_table = c.qualified_name()?;
        let primary_fields = if c.peek() == Some(&Token::LParen) {
            column_list(c.paren_group()?)?
        } else {
            Vec::new()
        };
        self.fk_count += 1;
        let name = name.unwrap_or_else(|| format!("fk_{}_{}", self.table_name(), self.fk_count));
        let mut key = Key::foreign_key(
            self.naming.string_to_name(&name),
            fields,
            primary_table,
            primary_fields,
        );
        key.referenced_table = self.table_name();
        self.table.keys.push(key);
        Ok(())
    }

    fn clause(&mut self, tokens: &[Token]) -> Result<()> {
        let mut c = Cursor::new(tokens);
        let name = if c.eat_keyword("CONSTRAINT") {
            Some(c.identifier()?)
        } else {
            None
        };

        if c.eat_keyword("PRIMARY") {
            c.expect_keyword("KEY")?;
            let fields = column_list(c.paren_group()?)?;
            self.set_pk(name, fields)
        } else if c.peek_keyword("UNIQUE") && c.peek_at(1) == Some(&Token::LParen) {
            c.next();
            let fields = column_list(c.paren_group()?)?;
            self.add_unique(name, fields);
            Ok(())
        } else if c.eat_keyword("FOREIGN") {
            c.expect_keyword("KEY")?;
            let fields = column_list(c.paren_group()?)?;
            c.expect_keyword("REFERENCES")?;
            self.add_foreign_key(name, fields, &mut c)
        } else if c.eat_keyword("CHECK") {
            debug!(table = %self.table.name, "skipping check constraint");
            Ok(())
        } else if name.is_some() {
            Err(c.unexpected("PRIMARY KEY, UNIQUE, FOREIGN KEY or CHECK"))
        } else {
            self.column(&mut c)
        }
    }

    fn column(&mut self, c: &mut Cursor<'_>) -> Result<()> {
        let name = c.identifier()?;

        let mut type_words = Vec::new();
        while let Some(Token::Word(word)) = c.peek() {
            if is_column_keyword(word) {
                break;
            }
            type_words.push(word.clone());
            c.next();
        }
        let field_type = resolve_type(&type_words)?;

        let mut field = Field::new(self.naming.string_to_name(&name), field_type);
        if !type_words.is_empty() && c.peek() == Some(&Token::LParen) {
            let sizes: Vec<u32> = split_top_level(c.paren_group()?, &Token::Comma)
                .iter()
                .map(|part| match part {
                    [Token::Number(n)] => n.parse().unwrap_or(0),
                    _ => 0,
                })
                .collect();
            field.size = sizes.first().copied().unwrap_or(0);
            field.scale = sizes.get(1).copied().unwrap_or(0);
        }

        let mut constraint_name: Option<String> = None;
        while let Some(token) = c.next() {
            let Token::Word(word) = token else {
                debug!(column = %name, token = %token, "skipping token");
                continue;
            };
            match word.to_uppercase().as_str() {
                "CONSTRAINT" => constraint_name = Some(c.identifier()?),
                "PRIMARY" => {
                    c.expect_keyword("KEY")?;
                    if !c.eat_keyword("ASC") {
                        c.eat_keyword("DESC");
                    }
                    field.required = true;
                    self.set_pk(constraint_name.take(), vec![name.clone()])?;
                }
                "NOT" => {
                    if c.eat_keyword("NULL") {
                        field.required = true;
                    } else {
                        c.eat_keyword("DEFERRABLE");
                    }
                }
                "NULL" => field.required = false,
                "UNIQUE" => self.add_unique(constraint_name.take(), vec![name.clone()]),
                "AUTOINCREMENT" => field.auto_increment = true,
                "DEFAULT" => field.default = default_value(c)?,
                "CHECK" => {
                    c.paren_group()?;
                }
                "COLLATE" => {
                    c.identifier()?;
                }
                "REFERENCES" => {
                    self.add_foreign_key(constraint_name.take(), vec![name.clone()], c)?
                }
                "GENERATED" | "AS" => {
                    c.eat_keyword("ALWAYS");
                    c.eat_keyword("AS");
                    if c.peek() == Some(&Token::LParen) {
                        c.paren_group()?;
                    }
                }
                "ON" => skip_on_clause(c),
                _ => debug!(column = %name, word = %word, "skipping modifier"),
            }
        }

        self.table.fields.push(field);
        Ok(())
    }

    /// Check every key against the parsed columns and apply the rowid rule:
    /// a single-column INTEGER primary key is an auto-increment row id.
    fn finish(mut self) -> Result<Table> {
        let table = &self.table;
        for key in table.pk.iter().chain(table.keys.iter()) {
            if !(key.is_foreign_key() && key.primary_fields.is_empty()) {
                key.validate()?;
            }
            for field in &key.fields {
                table.find_field(field).map_err(|_| {
                    data_error(format!(
                        "Key {} of table {} references undeclared field {}",
                        key.name, table.name, field
                    ))
                })?;
            }
        }

        let rowid = match &self.table.pk {
            Some(pk) if pk.fields.len() == 1 => Some(pk.fields[0].clone()),
            _ => None,
        };
        if let Some(field_name) = rowid {
            let field = self.table.find_field_mut(&field_name)?;
            if field.field_type == FieldType::Integer {
                field.auto_increment = true;
            }
        }
        Ok(self.table)
    }
}

/// Value after `DEFAULT`: a literal, a number, a keyword or a parenthesized expression.
/// `DEFAULT NULL` is the same as no default.
fn default_value(c: &mut Cursor<'_>) -> Result<Option<String>> {
    match c.peek() {
        Some(Token::LParen) => {
            let group = c.paren_group()?;
            Ok(Some(format!("({})", render(group))))
        }
        Some(Token::Literal(s)) | Some(Token::Number(s)) => {
            c.next();
            Ok(Some(s.clone()))
        }
        Some(Token::Word(w)) if w.eq_ignore_ascii_case("NULL") => {
            c.next();
            Ok(None)
        }
        Some(Token::Word(w)) | Some(Token::Quoted(w)) => {
            c.next();
            Ok(Some(w.clone()))
        }
        _ => Err(c.unexpected("a default value")),
    }
}

/// Parses SQLite schema text into tables
pub struct SqliteParser<'n> {
    naming: &'n dyn Naming,
}

impl<'n> SqliteParser<'n> {
    pub fn new(naming: &'n dyn Naming) -> Self {
        Self { naming }
    }

    /// Parse a script of `CREATE TABLE` and `CREATE INDEX` statements.
    ///
    /// Indexes are attached to their tables; foreign keys that name no parent
    /// columns are completed with the parent's primary key. Other statements
    /// are ignored.
    pub fn parse_script(&self, script: &str) -> Result<Vec<Table>> {
        let tokens = tokenize(script)?;
        let mut tables: Vec<Table> = Vec::new();
        let mut indexes: Vec<(String, Key)> = Vec::new();

        for statement in split_top_level(&tokens, &Token::Semicolon) {
            if statement.is_empty() {
                continue;
            }
            match classify(statement) {
                StatementKind::CreateTable => {
                    if let Some(table) = self.create_table(statement)? {
                        tables.push(table);
                    }
                }
                StatementKind::CreateIndex => indexes.push(self.create_index(statement)?),
                StatementKind::Other => {
                    debug!(statement = %render(statement), "skipping statement");
                }
            }
        }

        for (table_name, key) in indexes {
            if is_system_table(&table_name) {
                continue;
            }
            let table = tables
                .iter_mut()
                .find(|t| t.name.raw() == table_name)
                .ok_or_else(|| {
                    data_error(format!(
                        "Index {} is on unknown table {}",
                        key.name, table_name
                    ))
                })?;
            for field in &key.fields {
                table.find_field(field)?;
            }
            table.keys.push(key);
        }

        complete_foreign_keys(&mut tables)?;
        Ok(tables)
    }

    /// Parse a single `CREATE TABLE` statement; system tables yield `None`.
    ///
    /// A bare `REFERENCES parent` is a `Data` error here;
    /// [`SqliteParser::parse_script`] completes it from the parent's primary key.
    pub fn parse_create_table(&self, statement: &str) -> Result<Option<Table>> {
        let tokens = tokenize(statement)?;
        let statement = split_top_level(&tokens, &Token::Semicolon)
            .into_iter()
            .find(|s| !s.is_empty())
            .ok_or_else(|| data_error("Empty CREATE TABLE statement"))?;
        let table = self.create_table(statement)?;
        if let Some(table) = &table {
            if let Some(key) = table
                .outgoing_foreign_keys()
                .find(|k| k.primary_fields.is_empty())
            {
                return Err(data_error(format!(
                    "Foreign key {} of table {} names no columns of {}",
                    key.name, table.name, key.primary_table
                )));
            }
        }
        Ok(table)
    }

    fn create_table(&self, statement: &[Token]) -> Result<Option<Table>> {
        let mut c = Cursor::new(statement);
        c.expect_keyword("CREATE")?;
        if !c.eat_keyword("TEMP") {
            c.eat_keyword("TEMPORARY");
        }
        c.expect_keyword("TABLE")?;
        if c.eat_keyword("IF") {
            c.expect_keyword("NOT")?;
            c.expect_keyword("EXISTS")?;
        }
        let name = c.qualified_name()?;
        if is_system_table(&name) {
            warn!(table = %name, "skipping system table");
            return Ok(None);
        }
        if c.peek_keyword("AS") {
            return Err(data_error(format!(
                "Table {} is defined by a query and has no column list",
                name
            )));
        }

        let body = c.paren_group()?;
        let mut builder = TableBuilder::new(self.naming, &name);
        for clause in split_top_level(body, &Token::Comma) {
            if clause.is_empty() {
                return Err(data_error(format!("Empty clause in table {}", name)));
            }
            builder.clause(clause)?;
        }
        builder.finish().map(Some)
    }

    fn create_index(&self, statement: &[Token]) -> Result<(String, Key)> {
        let mut c = Cursor::new(statement);
        c.expect_keyword("CREATE")?;
        let key_type = if c.eat_keyword("UNIQUE") {
            KeyType::Unique
        } else {
            KeyType::Index
        };
        c.expect_keyword("INDEX")?;
        if c.eat_keyword("IF") {
            c.expect_keyword("NOT")?;
            c.expect_keyword("EXISTS")?;
        }
        let name = c.qualified_name()?;
        c.expect_keyword("ON")?;
        let table_name = c.qualified_name()?;
        let fields = column_list(c.paren_group()?)?;
        let mut key = Key::new(self.naming.string_to_name(&name), key_type, fields);
        key.referenced_table = table_name.clone();
        Ok((table_name, key))
    }
}

fn is_system_table(name: &str) -> bool {
    name.to_lowercase().starts_with("sqlite_")
}

/// Fill in `REFERENCES parent` without columns from the parent's primary key
fn complete_foreign_keys(tables: &mut [Table]) -> Result<()> {
    let mut missing = Vec::new();
    for (t, table) in tables.iter().enumerate() {
        for (k, key) in table.keys.iter().enumerate() {
            if key.is_foreign_key() && key.primary_fields.is_empty() {
                missing.push((t, k, key.primary_table.clone()));
            }
        }
    }
    for (t, k, parent) in missing {
        let pk_fields = tables
            .iter()
            .find(|table| table.name.raw() == parent)
            .and_then(|table| table.pk.as_ref())
            .map(|pk| pk.fields.clone())
            .ok_or_else(|| {
                data_error(format!(
                    "Foreign key of table {} references {} which has no primary key",
                    tables[t].name, parent
                ))
            })?;
        tables[t].keys[k].primary_fields = pk_fields;
        tables[t].keys[k].validate()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::DefaultNaming;

    fn parse(sql: &str) -> Table {
        SqliteParser::new(&DefaultNaming)
            .parse_create_table(sql)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_tokenizer() {
        let tokens = tokenize("a \"b c\" [d] `e` 'it''s' -1.5e+3 -- note\n/* x */ (,);").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Word("a".into()),
                Token::Quoted("b c".into()),
                Token::Quoted("d".into()),
                Token::Quoted("e".into()),
                Token::Literal("it's".into()),
                Token::Number("-1.5e+3".into()),
                Token::LParen,
                Token::Comma,
                Token::RParen,
                Token::Semicolon,
            ]
        );
        assert!(tokenize("'open").unwrap_err().is_data_error());
    }

    #[test]
    fn test_inline_modifiers_in_any_order() {
        let table = parse(
            "CREATE TABLE person (
                id INTEGER PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                nick TEXT DEFAULT 'n/a' NOT NULL UNIQUE,
                score REAL NULL DEFAULT -1
            )",
        );
        assert_eq!(table.name.raw(), "person");
        let pk = table.pk.as_ref().unwrap();
        assert_eq!(pk.name.raw(), "pk_person");
        assert_eq!(pk.fields, ["id"]);

        let id = table.find_field("id").unwrap();
        assert!(id.auto_increment && id.required);

        let email = table.find_field("email").unwrap();
        assert!(email.required);
        let nick = table.find_field("nick").unwrap();
        assert!(nick.required);
        assert_eq!(nick.default.as_deref(), Some("n/a"));
        let score = table.find_field("score").unwrap();
        assert!(!score.required);
        assert_eq!(score.default.as_deref(), Some("-1"));

        let uniques: Vec<&str> = table.keys.iter().map(|k| k.name.raw()).collect();
        assert_eq!(uniques, ["ux_person_1", "ux_person_2"]);
    }

    #[test]
    fn test_table_constraints() {
        let table = parse(
            "CREATE TABLE IF NOT EXISTS main.\"order_line\" (
                \"order_id\" INTEGER NOT NULL,
                [shop_id] INTEGER NOT NULL,
                line INTEGER,
                qty DECIMAL(10, 2),
                CONSTRAINT \"pk_line\" PRIMARY KEY (\"order_id\", line),
                UNIQUE (shop_id, line),
                CONSTRAINT fk_line_order FOREIGN KEY (order_id, shop_id) REFERENCES orders (id, shop_id) ON DELETE SET NULL,
                FOREIGN KEY (line) REFERENCES line_kind(id),
                CHECK (qty > 0)
            );",
        );
        assert_eq!(table.name.raw(), "order_line");
        let pk = table.pk.as_ref().unwrap();
        assert_eq!(pk.name.raw(), "pk_line");
        assert_eq!(pk.fields, ["order_id", "line"]);
        assert!(!table.find_field("order_id").unwrap().auto_increment);

        let qty = table.find_field("qty").unwrap();
        assert_eq!((qty.field_type, qty.size, qty.scale), (FieldType::Decimal, 10, 2));

        assert_eq!(table.keys.len(), 3);
        assert_eq!(table.keys[0].name.raw(), "ux_order_line_1");
        let fk = &table.keys[1];
        assert_eq!(fk.name.raw(), "fk_line_order");
        assert_eq!(fk.fields, ["order_id", "shop_id"]);
        assert_eq!(fk.primary_table, "orders");
        assert_eq!(fk.primary_fields, ["id", "shop_id"]);
        assert_eq!(fk.referenced_table, "order_line");
        assert_eq!(table.keys[2].name.raw(), "fk_order_line_2");
    }

    #[test]
    fn test_inline_references_and_defaults() {
        let table = parse(
            "CREATE TABLE note (
                id INTEGER CONSTRAINT pk_note PRIMARY KEY AUTOINCREMENT,
                author_id INTEGER REFERENCES author(id) ON DELETE CASCADE NOT NULL,
                created DATETIME DEFAULT CURRENT_TIMESTAMP,
                body TEXT COLLATE NOCASE DEFAULT (lower('X'))
            )",
        );
        assert_eq!(table.pk.as_ref().unwrap().name.raw(), "pk_note");
        let author = table.find_field("author_id").unwrap();
        assert!(author.required);
        let fk = table.outgoing_foreign_keys().next().unwrap();
        assert_eq!(fk.name.raw(), "fk_note_1");
        assert_eq!(fk.primary_table, "author");
        assert_eq!(
            table.find_field("created").unwrap().default.as_deref(),
            Some("CURRENT_TIMESTAMP")
        );
        assert_eq!(table.find_field("body").unwrap().default.as_deref(), Some("(lower('X'))"));
    }

    #[test]
    fn test_system_tables_are_skipped() {
        let parser = SqliteParser::new(&DefaultNaming);
        assert!(parser
            .parse_create_table("CREATE TABLE sqlite_sequence(name,seq)")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_undeclared_key_field_is_an_error() {
        let parser = SqliteParser::new(&DefaultNaming);
        let err = parser
            .parse_create_table("CREATE TABLE t (a INTEGER, PRIMARY KEY (b))")
            .unwrap_err();
        assert!(err.is_data_error());
        let err = parser
            .parse_create_table("CREATE TABLE t (a BLOB)")
            .unwrap_err();
        assert!(err.is_datatype_error());
    }

    #[test]
    fn test_script_with_indexes_and_implicit_parent_columns() {
        let tables = SqliteParser::new(&DefaultNaming)
            .parse_script(
                "CREATE TABLE author (id INTEGER PRIMARY KEY, name TEXT);
                 CREATE TABLE book (id INTEGER PRIMARY KEY, author_id INTEGER REFERENCES author, title TEXT);
                 CREATE UNIQUE INDEX ux_title ON book (title);
                 CREATE INDEX IF NOT EXISTS ix_author ON \"book\" (author_id DESC);
                 CREATE VIEW v AS SELECT 1;",
            )
            .unwrap();
        assert_eq!(tables.len(), 2);
        let book = &tables[1];
        let fk = book.outgoing_foreign_keys().next().unwrap();
        assert_eq!(fk.primary_fields, ["id"]);
        let indexes: Vec<(&str, KeyType)> = book
            .keys
            .iter()
            .filter(|k| !k.is_foreign_key())
            .map(|k| (k.name.raw(), k.key_type))
            .collect();
        assert_eq!(indexes, [("ux_title", KeyType::Unique), ("ix_author", KeyType::Index)]);
    }

    #[test]
    fn test_index_on_schema_qualified_table() {
        let tables = SqliteParser::new(&DefaultNaming)
            .parse_script(
                "CREATE TABLE main.t (a INTEGER, b TEXT);
                 CREATE INDEX main.ix_t_a ON main.t (a);",
            )
            .unwrap();
        assert_eq!(tables[0].name.raw(), "t");
        assert_eq!(tables[0].keys[0].name.raw(), "ix_t_a");
        assert_eq!(tables[0].keys[0].fields, ["a"]);
    }

    #[test]
    fn test_bare_reference_needs_the_whole_script() {
        let err = SqliteParser::new(&DefaultNaming)
            .parse_create_table(
                "CREATE TABLE book (id INTEGER PRIMARY KEY, author_id INTEGER REFERENCES author)",
            )
            .unwrap_err();
        assert!(err.is_data_error());
    }

    #[test]
    fn test_index_on_unknown_table() {
        let err = SqliteParser::new(&DefaultNaming)
            .parse_script("CREATE INDEX ix ON ghost (a);")
            .unwrap_err();
        assert!(err.is_data_error());
    }
}
