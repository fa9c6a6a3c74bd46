extern crate proc_macro;

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, FnArg, ItemFn, PatType};

/// Runs the annotated async method inside a MongoDB transaction.
///
/// The method must take `session: &mut Session` and return `Result<_, E>`
/// where `E: From<mongodb::error::Error>`. The body is moved into a
/// `<name>_no_tx` sibling; the generated wrapper starts a transaction on the
/// session, commits on `Ok` and aborts on `Err`.
#[proc_macro_attribute]
pub fn tx(_args: TokenStream, input: TokenStream) -> TokenStream {
    let func = parse_macro_input!(input as ItemFn);
    let vis = &func.vis;
    let name = &func.sig.ident;
    let args = &func.sig.inputs;
    let ret = &func.sig.output;
    let body = &func.block;

    let forwarded: Vec<_> = args
        .iter()
        .map(|arg| match arg {
            FnArg::Typed(PatType { pat, .. }) => quote!(#pat),
            FnArg::Receiver(_) => quote!(self),
        })
        .collect();

    let inner = format_ident!("{}_no_tx", name);
    let expanded = quote! {
        #vis async fn #inner(#args) #ret #body

        #vis async fn #name(#args) #ret {
            session.start_transaction().await?;
            match Self::#inner(#(#forwarded),*).await {
                Ok(value) => {
                    session.commit_transaction().await?;
                    Ok(value)
                }
                Err(err) => {
                    session.abort_transaction().await?;
                    Err(err)
                }
            }
        }
    };

    TokenStream::from(expanded)
}
