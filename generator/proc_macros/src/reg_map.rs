use crate::common::{expand_call, join, RegisterAccess};
use proc_macro2::*;
use quote::quote;
use std::collections::HashSet;
use syn::parse::*;
use syn::punctuated::*;
use syn::*;
pub fn expand(input: TokenStream) -> TokenStream {
    let reg: RegMap = expand_call!(parse2(input));
    expand_call!(reg.validate());
    let output = expand_call!(reg.expand());
    quote! {
        #output
    }
}

mod kw {
    syn::custom_keyword!(aliased);
}

#[derive(Debug)]
struct RegMap {
    is_pub: bool,
    name: Ident,
    base: LitInt,
    revision: Option<LitStr>,
    regs: Regs,
}

impl RegMap {
    fn validate(&self) -> Result<()> {
        let base = self.base.base10_parse::<u32>()?;
        let mut offsets = HashSet::new();
        let mut names = HashSet::new();
        for r in self.regs.regs.iter() {
            let offset = r.offset.base10_parse::<u32>()?;
            if offset % 4 != 0 {
                return Err(Error::new(r.offset.span(), "offset must be word aligned!"));
            }
            if base.checked_add(offset).is_none() {
                return Err(Error::new(r.offset.span(), "address overflows 32 bits!"));
            }
            if !offsets.insert(offset) {
                return Err(Error::new(r.offset.span(), "offset already used!"));
            }
            if !names.insert(r.name.to_string()) {
                return Err(Error::new(r.name.span(), "register defined twice!"));
            }
            r.reset.base10_parse::<u32>()?;
            r.mask.base10_parse::<u32>()?;
            r.fields.validate()?;
        }
        Ok(())
    }

    fn expand(&self) -> Result<TokenStream> {
        let name = &self.name;
        let name_s = name.to_string();
        let base = &self.base;
        let revision = self
            .revision
            .as_ref()
            .map(|r| r.value())
            .unwrap_or_default();
        let vis = if self.is_pub {
            quote! {pub}
        } else {
            quote! {}
        };
        let regs = join(self.regs.regs.iter().map(|r| r.expand(&name_s, base)));
        Ok(quote! {
            #vis static #name: RegisterMap = RegisterMap {
                peripheral: #name_s,
                revision: #revision,
                base_address: #base,
                registers: &[
                    #regs
                ],
            };
        })
    }
}

impl Parse for RegMap {
    fn parse(input: ParseStream) -> Result<Self> {
        let is_pub = if input.peek(Token![pub]) {
            input.parse::<Token![pub]>()?;
            true
        } else {
            false
        };
        let name: Ident = input.parse::<Ident>()?;
        let content: ParseBuffer;
        parenthesized!(content in input);
        let base = content.parse::<LitInt>()?;
        let revision = if content.parse::<Token![,]>().is_ok() {
            Some(content.parse::<LitStr>()?)
        } else {
            None
        };
        let content1: ParseBuffer;
        braced!(content1 in input);
        Ok(RegMap {
            is_pub,
            name,
            base,
            revision,
            regs: content1.parse()?,
        })
    }
}

#[derive(Debug)]
struct Regs {
    regs: Punctuated<Reg, Token![;]>,
}

impl Parse for Regs {
    fn parse(input: ParseStream) -> Result<Self> {
        Ok(Regs {
            regs: input.parse_terminated(Reg::parse)?,
        })
    }
}

#[derive(Debug)]
struct Reg {
    name: Ident,
    access: RegisterAccess,
    aliased: bool,
    offset: LitInt,
    reset: LitInt,
    mask: LitInt,
    fields: Fields,
}

impl Reg {
    fn expand(&self, peripheral: &str, base: &LitInt) -> TokenStream {
        let name_s = self.name.to_string();
        let access = self.access.expand();
        let offset = &self.offset;
        let reset = &self.reset;
        let mask = &self.mask;
        let aliases = if self.aliased {
            quote! {Some(AliasOffsets::SET_CLR_TGL)}
        } else {
            quote! {None}
        };
        let fields = join(self.fields.fields.iter().map(|f| f.expand()));
        quote! {
            Register {
                name: #name_s,
                peripheral: #peripheral,
                base_address: #base,
                offset: #offset,
                width: 32,
                access: #access,
                reset_value: #reset,
                write_mask: #mask,
                aliases: #aliases,
                description: "",
                fields: &[
                    #fields
                ],
            },
        }
    }
}

impl Parse for Reg {
    fn parse(input: ParseStream) -> Result<Self> {
        let name = input.parse::<Ident>()?;
        let content: ParseBuffer;
        parenthesized!(content in input);
        let access = content.parse::<RegisterAccess>()?;
        let aliased = if content.parse::<Token![,]>().is_ok() {
            content.parse::<kw::aliased>()?;
            true
        } else {
            false
        };
        input.parse::<Token![:]>()?;
        let offset = input.parse::<LitInt>()?;
        input.parse::<Token![,]>()?;
        let reset = input.parse::<LitInt>()?;
        input.parse::<Token![,]>()?;
        let mask = input.parse::<LitInt>()?;
        let content1: ParseBuffer;
        braced!(content1 in input);
        Ok(Reg {
            name,
            access,
            aliased,
            offset,
            reset,
            mask,
            fields: content1.parse()?,
        })
    }
}

#[derive(Debug)]
struct Fields {
    fields: Punctuated<Field, Token![;]>,
}

impl Fields {
    fn validate(&self) -> Result<()> {
        let mut used = 0u64;
        let mut names = HashSet::new();
        for f in self.fields.iter() {
            let msb = f.msb.base10_parse::<u32>()?;
            let lsb = f.lsb.base10_parse::<u32>()?;
            if msb < lsb || msb > 31 {
                return Err(Error::new(f.msb.span(), "field must satisfy 31 >= msb >= lsb!"));
            }
            let mask = ((1u64 << (msb - lsb + 1)) - 1) << lsb;
            if used & mask != 0 {
                return Err(Error::new(f.name.span(), "field overlaps another field!"));
            }
            if !names.insert(f.name.to_string()) {
                return Err(Error::new(f.name.span(), "field defined twice!"));
            }
            used |= mask;
            for e in f.enums.iter().flatten() {
                if e.value.base10_parse::<u64>()? >= 1u64 << (msb - lsb + 1) {
                    return Err(Error::new(e.value.span(), "enum value does not fit the field!"));
                }
            }
        }
        Ok(())
    }
}

impl Parse for Fields {
    fn parse(input: ParseStream) -> Result<Self> {
        Ok(Fields {
            fields: input.parse_terminated(Field::parse)?,
        })
    }
}

#[derive(Debug)]
struct Field {
    name: Ident,
    access: RegisterAccess,
    enums: Option<Punctuated<RegEnum, Token![,]>>,
    msb: LitInt,
    lsb: LitInt,
}

impl Field {
    fn expand(&self) -> TokenStream {
        let name_s = self.name.to_string();
        let access = self.access.expand();
        // validated before expansion
        let msb = self.msb.base10_parse::<u32>().unwrap_or_default();
        let lsb = self.lsb.base10_parse::<u32>().unwrap_or_default();
        let width = msb - lsb + 1;
        let enums = join(self.enums.iter().flatten().map(|e| {
            let name_s = e.name.to_string();
            let value = &e.value;
            quote! {
                EnumVariant {name: #name_s, value: #value},
            }
        }));
        quote! {
            Field {
                name: #name_s,
                access: #access,
                bit_offset: #lsb,
                bit_width: #width,
                enums: &[#enums],
            },
        }
    }
}

impl Parse for Field {
    fn parse(input: ParseStream) -> Result<Self> {
        let name = input.parse::<Ident>()?;
        let content: ParseBuffer;
        parenthesized!(content in input);
        let access = content.parse::<RegisterAccess>()?;
        let enums = if input.peek(token::Brace) {
            let content: ParseBuffer;
            braced!(content in input);
            let enums: Punctuated<RegEnum, Token![,]> = content.parse_terminated(RegEnum::parse)?;
            Some(enums)
        } else {
            None
        };
        input.parse::<Token![:]>()?;
        let msb = input.parse::<LitInt>()?;
        input.parse::<Token![,]>()?;
        let lsb = input.parse::<LitInt>()?;
        Ok(Field {
            name,
            access,
            enums,
            msb,
            lsb,
        })
    }
}

#[derive(Debug)]
struct RegEnum {
    name: Ident,
    value: LitInt,
}
impl Parse for RegEnum {
    fn parse(input: ParseStream) -> Result<Self> {
        let name = input.parse::<Ident>()?;
        input.parse::<Token![:]>()?;
        let value = input.parse::<LitInt>()?;
        Ok(RegEnum { name, value })
    }
}
