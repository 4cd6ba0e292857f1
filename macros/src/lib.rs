use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::parse::{Parse, ParseStream};
use syn::spanned::Spanned;
use syn::{parse_macro_input, Attribute, ImplItem, ItemImpl, LitInt, LitStr, Meta, Type};

/// Generates an Axum router and an OpenAPI description from an impl block.
///
/// Usage:
/// ```rust,ignore
/// struct HealthController;
///
/// #[controller(state = AppState)]
/// impl HealthController {
///     #[get("/ping")]
///     #[utoipa_response(status = 200, body = Pong)]
///     pub async fn ping() -> Json<Pong> { ... }
/// }
/// ```
///
/// Emits `impl Controller for HealthController` (with `State = AppState`, or
/// `()` when no state is given) and a `HealthControllerApi` struct deriving
/// `utoipa::OpenApi` that can be nested into a bigger document.
#[proc_macro_attribute]
pub fn controller(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(args as ControllerArgs);
    let impl_block = parse_macro_input!(input as ItemImpl);
    let self_ty = &impl_block.self_ty;

    let struct_name = match &**self_ty {
        Type::Path(type_path) => match type_path.path.segments.last() {
            Some(segment) => &segment.ident,
            None => {
                return syn::Error::new(impl_block.span(), "Expected a struct type")
                    .to_compile_error()
                    .into();
            }
        },
        _ => {
            return syn::Error::new(impl_block.span(), "Expected a struct type")
                .to_compile_error()
                .into();
        }
    };

    let state_ty = match &args.state {
        Some(ty) => quote! { #ty },
        None => quote! { () },
    };
    let struct_name_str = struct_name.to_string();

    let mut route_registrations = Vec::new();
    let mut openapi_path_functions = Vec::new();
    let mut openapi_path_names = Vec::new();
    let mut schema_types = Vec::new();

    for item in &impl_block.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let Some((method_name, path)) = extract_route_attr(&method.attrs) else {
            continue;
        };

        let fn_name = &method.sig.ident;
        let axum_method = format_ident!("{}", method_name);
        route_registrations.push(quote! {
            router = router.route(#path, axum::routing::#axum_method(#struct_name::#fn_name));
        });

        // utoipa::path has to sit on a free function, so a documentation-only
        // twin of the handler is emitted next to the impl block.
        let wrapper_name = format_ident!("__utoipa_path_{}", fn_name);
        let fn_vis = &method.vis;
        let fn_async = method.sig.asyncness;
        let fn_inputs = &method.sig.inputs;
        let fn_output = &method.sig.output;
        let fn_generics = &method.sig.generics;
        let fn_where_clause = &method.sig.generics.where_clause;
        let path_lit = LitStr::new(&path, method.span());
        let fn_name_str = fn_name.to_string();

        let responses = extract_utoipa_response_attrs(&method.attrs);
        let responses = if responses.is_empty() {
            quote! {}
        } else {
            quote! { responses(#(#responses),*), }
        };

        openapi_path_functions.push(quote! {
            #[doc = concat!("OpenAPI description of ", #struct_name_str, "::", #fn_name_str, ".")]
            #[doc = "Never called; the router dispatches to the real handler."]
            #[allow(dead_code, unused_variables)]
            #[utoipa::path(
                #axum_method,
                path = #path_lit,
                tag = #struct_name_str,
                #responses
            )]
            #fn_vis #fn_async fn #wrapper_name #fn_generics(#fn_inputs) #fn_output #fn_where_clause {
                unimplemented!("documentation-only wrapper")
            }
        });
        openapi_path_names.push(wrapper_name);
        schema_types.extend(extract_response_schema_types(&method.attrs));
    }

    let mut unique_schemas = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for schema_type in schema_types {
        if seen.insert(quote!(#schema_type).to_string()) {
            unique_schemas.push(schema_type);
        }
    }

    let components = if unique_schemas.is_empty() {
        quote! {}
    } else {
        quote! { , components(schemas(#(#unique_schemas),*)) }
    };

    let api_struct_name = format_ident!("{}Api", struct_name);

    let expanded = quote! {
        #impl_block

        impl clinica_core::controller::Controller for #self_ty {
            type State = #state_ty;

            #[allow(unused_mut)]
            fn router() -> axum::Router<Self::State> {
                let mut router = axum::Router::<Self::State>::new();

                #(#route_registrations)*

                router
            }
        }

        #(#openapi_path_functions)*

        #[derive(utoipa::OpenApi)]
        #[openapi(paths(#(#openapi_path_names),*) #components)]
        pub struct #api_struct_name;
    };

    TokenStream::from(expanded)
}

/// Arguments of `#[controller(...)]`: nothing, or `state = Type`.
struct ControllerArgs {
    state: Option<Type>,
}

impl Parse for ControllerArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut state = None;

        while !input.is_empty() {
            let key: syn::Ident = input.parse()?;
            let _eq: syn::Token![=] = input.parse()?;

            if key == "state" {
                state = Some(input.parse()?);
            } else {
                return Err(syn::Error::new(key.span(), format!("Unknown argument: {}", key)));
            }

            if !input.is_empty() {
                let _comma: syn::Token![,] = input.parse()?;
            }
        }

        Ok(ControllerArgs { state })
    }
}

/// Finds `#[get("/path")]` style attributes (also path-qualified ones such as
/// `#[clinica_macros::get("/path")]`). They are still present because the
/// controller macro expands before the pass-through route macros.
fn extract_route_attr(attrs: &[Attribute]) -> Option<(String, String)> {
    attrs.iter().find_map(|attr| {
        let method = attr.path().segments.last()?.ident.to_string().to_lowercase();
        if !matches!(method.as_str(), "get" | "post" | "put" | "delete" | "patch") {
            return None;
        }

        let Meta::List(meta) = &attr.meta else {
            return None;
        };
        let path_lit = syn::parse2::<LitStr>(meta.tokens.clone()).ok()?;

        Some((method, path_lit.value()))
    })
}

fn utoipa_response_attrs(attrs: &[Attribute]) -> impl Iterator<Item = proc_macro2::TokenStream> + '_ {
    attrs.iter().filter_map(|attr| {
        let last = attr.path().segments.last()?;
        if last.ident != "utoipa_response" {
            return None;
        }
        match &attr.meta {
            Meta::List(meta) => Some(meta.tokens.clone()),
            _ => None,
        }
    })
}

/// Turns every `#[utoipa_response(...)]` into an entry of `responses(...)`.
///
/// - `#[utoipa_response(Type)]` is a 200 with `Type` as body
/// - `#[utoipa_response(status = 500, body = Type, description = "...")]`
/// - `#[utoipa_response(response = Type)]` for `IntoResponses` types
fn extract_utoipa_response_attrs(attrs: &[Attribute]) -> Vec<proc_macro2::TokenStream> {
    let mut responses = Vec::new();

    for tokens in utoipa_response_attrs(attrs) {
        if let Ok(parsed) = syn::parse2::<UtoipaResponseArgs>(tokens.clone()) {
            if let Some(response_type) = parsed.response {
                responses.push(quote! { #response_type });
                continue;
            }

            if let Some(body_type) = parsed.body {
                let status = parsed.status.unwrap_or(200);
                let description = parsed.description.as_deref().unwrap_or("Success");

                responses.push(quote! {
                    (status = #status, description = #description, body = #body_type)
                });
                continue;
            }
        }

        if let Ok(response_type) = syn::parse2::<Type>(tokens) {
            responses.push(quote! {
                (status = 200, description = "Success", body = #response_type)
            });
        }
    }

    responses
}

/// Body types named by `#[utoipa_response(...)]`, registered as schemas.
fn extract_response_schema_types(attrs: &[Attribute]) -> Vec<Type> {
    let mut schema_types = Vec::new();

    for tokens in utoipa_response_attrs(attrs) {
        if let Ok(parsed) = syn::parse2::<UtoipaResponseArgs>(tokens.clone()) {
            if let Some(body_type) = parsed.body {
                schema_types.push(body_type);
            }
            continue;
        }

        if let Ok(response_type) = syn::parse2::<Type>(tokens) {
            schema_types.push(response_type);
        }
    }

    schema_types
}

#[derive(Debug)]
struct UtoipaResponseArgs {
    status: Option<u16>,
    body: Option<Type>,
    response: Option<Type>,
    description: Option<String>,
}

impl Parse for UtoipaResponseArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut status = None;
        let mut body = None;
        let mut response = None;
        let mut description = None;

        while !input.is_empty() {
            let key: syn::Ident = input.parse()?;
            let _eq: syn::Token![=] = input.parse()?;

            match key.to_string().as_str() {
                "status" => {
                    let lit: LitInt = input.parse()?;
                    status = Some(lit.base10_parse::<u16>()?);
                }
                "body" => body = Some(input.parse()?),
                "response" => response = Some(input.parse()?),
                "description" => {
                    let lit: LitStr = input.parse()?;
                    description = Some(lit.value());
                }
                other => {
                    return Err(syn::Error::new(key.span(), format!("Unknown argument: {}", other)));
                }
            }

            if !input.is_empty() {
                let _comma: syn::Token![,] = input.parse()?;
            }
        }

        if body.is_some() && response.is_some() {
            return Err(input.error("Cannot specify both 'body' and 'response'."));
        }

        Ok(UtoipaResponseArgs {
            status,
            body,
            response,
            description,
        })
    }
}

/// GET route, read by `#[controller]`.
#[proc_macro_attribute]
pub fn get(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// POST route, read by `#[controller]`.
#[proc_macro_attribute]
pub fn post(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// PUT route, read by `#[controller]`.
#[proc_macro_attribute]
pub fn put(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// DELETE route, read by `#[controller]`.
#[proc_macro_attribute]
pub fn delete(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// PATCH route, read by `#[controller]`.
#[proc_macro_attribute]
pub fn patch(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Response documentation for a route, read by `#[controller]`.
///
/// Can be repeated for several status codes.
#[proc_macro_attribute]
pub fn utoipa_response(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}
