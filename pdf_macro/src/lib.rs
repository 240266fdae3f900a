mod pdf_enum;

use pdf_enum::pdf_enum_inner;
use proc_macro::TokenStream;

/// Turns a fieldless enum whose variants are assigned PDF names (the default)
/// or integers (`#[pdf_enum(Integer)]`) into a type that can be read from an
/// object with `FromObj`
#[proc_macro_attribute]
pub fn pdf_enum(attr: TokenStream, item: TokenStream) -> TokenStream {
    pdf_enum_inner(attr, item)
}
