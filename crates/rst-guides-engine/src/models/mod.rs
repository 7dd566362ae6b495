pub mod document;
pub mod node;

pub use document::{Document, TitleEntry};
pub use node::{
    Admonition, Code, DefinitionItem, Figure, Image, List, ListItem, Node, NodeKind, Table,
    TableCell, TableRow, Title, Toc, TocEntry,
};
