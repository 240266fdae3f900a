use proc_macro::TokenStream;
use proc_macro2::Ident;
use quote::quote;
use syn::{
    braced, parse::Parse, parse_macro_input, punctuated::Punctuated, token, Lit, Token, Visibility,
};

struct PdfEnumVariant {
    attrs: Vec<syn::Attribute>,
    name: Ident,
    #[allow(dead_code)]
    tok_eq: Token![=],
    value: Lit,
}

impl Parse for PdfEnumVariant {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        Ok(PdfEnumVariant {
            attrs: input.call(syn::Attribute::parse_outer)?,
            name: input.parse()?,
            tok_eq: input.parse()?,
            value: input.parse()?,
        })
    }
}

struct PdfEnum {
    attrs: Vec<syn::Attribute>,
    vis: Visibility,
    #[allow(dead_code)]
    kw_enum: Token![enum],
    name: Ident,
    #[allow(dead_code)]
    tok_brace: token::Brace,
    variants: Punctuated<PdfEnumVariant, Token![,]>,
}

impl Parse for PdfEnum {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let content;
        Ok(PdfEnum {
            attrs: input.call(syn::Attribute::parse_outer)?,
            vis: input.parse()?,
            kw_enum: input.parse()?,
            name: input.parse()?,
            tok_brace: braced!(content in input),
            variants: content.parse_terminated(PdfEnumVariant::parse, Token![,])?,
        })
    }
}

/// The kind of object an enum is stored as
#[derive(PartialEq)]
enum ObjectKind {
    Name,
    Integer,
}

impl ObjectKind {
    fn from_attr(attr: Option<Ident>) -> syn::Result<Self> {
        match attr {
            None => Ok(ObjectKind::Name),
            Some(ident) if ident == "Name" => Ok(ObjectKind::Name),
            Some(ident) if ident == "Integer" => Ok(ObjectKind::Integer),
            Some(ident) => Err(syn::Error::new(
                ident.span(),
                "expected `Name` or `Integer`",
            )),
        }
    }
}

pub fn pdf_enum_inner(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr = parse_macro_input!(attr as Option<Ident>);
    let object_kind = match ObjectKind::from_attr(attr) {
        Ok(kind) => kind,
        Err(err) => return err.to_compile_error().into(),
    };
    let PdfEnum {
        vis,
        name,
        variants,
        attrs,
        ..
    } = parse_macro_input!(item as PdfEnum);

    let variant_attrs = variants.iter().map(|v| &v.attrs).collect::<Vec<_>>();
    let variant_names = variants.iter().map(|v| &v.name).collect::<Vec<_>>();
    let variant_values = variants.iter().map(|v| &v.value).collect::<Vec<_>>();

    let body = match object_kind {
        ObjectKind::Name => quote!(
            #(
                #(#variant_attrs)*
                #variant_names,
            )*
        ),
        ObjectKind::Integer => quote!(
            #(
                #(#variant_attrs)*
                #variant_names = #variant_values,
            )*
        ),
    };

    let (parse_fn, from_obj_body) = match object_kind {
        ObjectKind::Name => (
            quote!(
                pub fn from_str(s: &str) -> crate::PdfResult<Self> {
                    Ok(match s {
                        #(#variant_values => Self::#variant_names,)*
                        _ => anyhow::bail!(crate::error::ParseError::UnrecognizedVariant {
                            ty: stringify!(#name),
                            found: s.to_owned(),
                        }),
                    })
                }

                pub fn as_str(&self) -> &'static str {
                    match self {
                        #(Self::#variant_names => #variant_values,)*
                    }
                }
            ),
            quote!(Self::from_str(&resolver.assert_name(obj)?)),
        ),
        ObjectKind::Integer => (
            quote!(
                pub fn from_integer(n: i32) -> crate::PdfResult<Self> {
                    Ok(match n {
                        #(#variant_values => Self::#variant_names,)*
                        _ => anyhow::bail!(crate::error::ParseError::UnrecognizedVariant {
                            ty: stringify!(#name),
                            found: n.to_string(),
                        }),
                    })
                }
            ),
            quote!(Self::from_integer(resolver.assert_integer(obj)?)),
        ),
    };

    quote!(
        #(#attrs)*
        #[derive(Debug, Clone, Copy, Eq, PartialEq)]
        #vis enum #name {
            #body
        }

        #[allow(dead_code)]
        impl #name {
            #parse_fn
        }

        impl crate::FromObj for #name {
            fn from_obj(
                obj: crate::objects::Object,
                resolver: &mut dyn crate::resolve::Resolve,
            ) -> crate::PdfResult<Self> {
                #from_obj_body
            }
        }
    )
    .into()
}
