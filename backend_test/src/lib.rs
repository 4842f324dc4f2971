use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous endpoint test into a synchronous one and inject
/// dependencies.
///
/// Injectable dependencies are [`rocket::local::asynchronous::Client`],
/// [`crate::clock::ManualClock`] and [`crate::model::oracle::StaticOracle`].
/// The clock and oracle are the ones the client's server reads from; the clock
/// starts at the fixture instant `T` used throughout the model tests.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        return syn::Error::new(
            TokenStream2::from(args).span(),
            "`backend_test` takes no arguments",
        )
        .into_compile_error()
        .into();
    }
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract type information and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// Test setup.
            async fn setup() -> (
                rocket::local::asynchronous::Client,
                crate::clock::ManualClock,
                crate::model::oracle::StaticOracle,
            ) {
                let clock = crate::clock::ManualClock::new(
                    crate::model::election::config::examples::t0(),
                );
                let oracle = crate::model::oracle::StaticOracle::default();
                let rocket = crate::rocket_for_clock_and_oracle(
                    crate::test_figment(),
                    crate::clock::Clock::manual(clock.clone()),
                    std::sync::Arc::new(oracle.clone()),
                );
                let rocket_client = rocket::local::asynchronous::Client::untracked(rocket)
                    .await
                    .unwrap();
                (rocket_client, clock, oracle)
            }

            /// The test itself.
            #item_fn

            let runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                #[allow(unused_variables)]
                let (rocket_client, clock, oracle) = setup().await;
                #new_name(#(#test_args),*).await
            });
        }
    }
    .into()
}

/// Ensure the wrapped test is async, map its parameters onto the injected values,
/// and reject unknown parameters.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut seen = vec![];
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let (Pat::Ident(_), Type::Path(type_path)) = (&*pat_type.pat, &*pat_type.ty) {
                // Valid as the last path segment for any type is itself.
                let type_ident = &type_path.path.segments.last().unwrap().ident;
                let injected = if type_ident == "Client" {
                    Some(quote! { rocket_client })
                } else if type_ident == "ManualClock" {
                    Some(quote! { clock.clone() })
                } else if type_ident == "StaticOracle" {
                    Some(quote! { oracle.clone() })
                } else {
                    None
                };
                if let Some(injected) = injected {
                    if seen.contains(type_ident) {
                        return Err(syn::Error::new(
                            input.span(),
                            format!("Test cannot accept more than one `{type_ident}`"),
                        ));
                    }
                    seen.push(type_ident.clone());
                    args.push(injected);
                    continue;
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `client: Client`, `clock: ManualClock` or `oracle: StaticOracle`",
        ));
    }

    Ok(args)
}
