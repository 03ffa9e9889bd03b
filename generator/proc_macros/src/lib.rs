mod common;
mod reg_map;

/// Declares a static `RegisterMap` from an inline register description.
///
/// ```ignore
/// reg_map! {
///     pub TOY(0x4000_0000, "revA") {
///         FOO(RW): 0x10, 0x5, 0xffff_ffff {
///             BAR(RW): 2, 0;
///             MODE(RW){slow: 0, fast: 1}: 5, 4;
///         };
///         CMD(WO, aliased): 0x14, 0x0, 0x3 {
///             START(WO): 0, 0;
///             STOP(WO): 1, 1;
///         };
///     }
/// }
/// ```
///
/// Registers are `NAME(ACCESS[, aliased]): offset, reset, write_mask { fields }`,
/// fields are `NAME(ACCESS)[{enums}]: msb, lsb`. Layout errors are reported
/// at compile time.
#[proc_macro]
pub fn reg_map(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = proc_macro2::TokenStream::from(input);
    let output: proc_macro2::TokenStream = reg_map::expand(input);
    proc_macro::TokenStream::from(output)
}
