use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr, Meta};

/// 为结构体自动实现 `optreg::Loadable`
///
/// 标注 `#[option("name")]` 的字段使用对应选项加载；
/// 结构体上的 `#[option(prefix = "p")]` 让只写 `#[option]` 的字段使用 `p.<字段名>`。
/// 所有字段都会尝试加载，生成的实现总是返回 true。
///
/// # 示例
/// ```ignore
/// use optreg::Loadable;
///
/// #[derive(Loadable)]
/// #[option(prefix = "printer")]
/// struct Printer {
///     #[option]
///     text: String,
///     #[option("printer.padding")]
///     padding: usize,
/// }
/// ```
#[proc_macro_derive(Loadable, attributes(option))]
pub fn loadable_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut prefix: Option<String> = None;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("option")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("prefix") {
                let lit: LitStr = meta.value()?.parse()?;
                prefix = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("expected `prefix = \"...\"`"))
            }
        })?;
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    struct_name,
                    "Loadable can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "Loadable can only be derived for structs",
            ))
        }
    };

    let mut loads = Vec::new();
    for field in fields {
        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("option")) else {
            continue;
        };
        let ident = field.ident.as_ref().ok_or_else(|| {
            syn::Error::new_spanned(field, "Loadable fields must be named")
        })?;
        let name = match &attr.meta {
            Meta::Path(_) => match &prefix {
                Some(prefix) => format!("{}.{}", prefix, ident),
                None => ident.to_string(),
            },
            Meta::List(_) => attr.parse_args::<LitStr>()?.value(),
            Meta::NameValue(_) => {
                return Err(syn::Error::new_spanned(attr, "expected #[option] or #[option(\"name\")]"))
            }
        };
        loads.push(quote! {
            registry.load(&mut self.#ident, #name);
        });
    }

    Ok(quote! {
        impl #impl_generics ::optreg::Loadable for #struct_name #ty_generics #where_clause {
            fn load_from(&mut self, registry: &::optreg::Registry) -> bool {
                #(#loads)*
                true
            }
        }
    })
}
