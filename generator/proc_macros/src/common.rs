use proc_macro2::*;
use quote::quote;
use syn::parse::*;

macro_rules! expand_call {
    ($exp:expr) => {
        match $exp {
            Ok(result) => result,
            Err(err) => return err.to_compile_error(),
        }
    };
}
pub(crate) use expand_call;

mod reg_kw {
    syn::custom_keyword!(RO);
    syn::custom_keyword!(WO);
    syn::custom_keyword!(RW);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RegisterAccess {
    RO,
    WO,
    RW,
}
impl RegisterAccess {
    pub(crate) fn expand(&self) -> TokenStream {
        match self {
            RegisterAccess::RO => quote! {Access::ReadOnly},
            RegisterAccess::WO => quote! {Access::WriteOnly},
            RegisterAccess::RW => quote! {Access::ReadWrite},
        }
    }
}

impl Parse for RegisterAccess {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.parse::<reg_kw::RO>().is_ok() {
            Ok(RegisterAccess::RO)
        } else if input.parse::<reg_kw::WO>().is_ok() {
            Ok(RegisterAccess::WO)
        } else if input.parse::<reg_kw::RW>().is_ok() {
            Ok(RegisterAccess::RW)
        } else {
            Err(input.error("Invalid access type!"))
        }
    }
}

pub(crate) fn join(items: impl Iterator<Item = TokenStream>) -> TokenStream {
    items.fold(quote! {}, |acc, e| {
        quote! {
            #acc
            #e
        }
    })
}
