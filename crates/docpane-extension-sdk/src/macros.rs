//! Export macro for Rust-native extensions.

/// Export a type implementing [`Extension`] as a loadable extension.
///
/// Expands to the `docpane_extension` descriptor plus the paired
/// create and destroy entry points the host calls through it. The type
/// must implement [`Extension`] and [`Default`], and the crate must be
/// built as a `cdylib`.
///
/// # Example
///
/// ```
/// use docpane_extension_sdk::prelude::*;
/// use docpane_extension_sdk::export_extension;
/// use std::path::Path;
///
/// #[derive(Default)]
/// struct ManPages;
///
/// impl Extension for ManPages {
///     fn applicability(&self) -> Applicability {
///         Applicability::Small
///     }
///
///     fn doc_tree(&mut self, _path: &Path) -> Option<DocNode> {
///         None
///     }
///
///     fn doc(&self, _node: DocRef) -> Document {
///         Document::html("")
///     }
/// }
///
/// export_extension!(ManPages);
/// ```
///
/// [`Extension`]: crate::types::Extension
#[macro_export]
macro_rules! export_extension {
    ($ty:ty) => {
        /// Entry point probed by the Docpane host.
        #[no_mangle]
        #[allow(non_upper_case_globals)]
        pub static docpane_extension: $crate::descriptor::ExtensionDescriptor =
            $crate::descriptor::ExtensionDescriptor {
                create: Some(docpane_extension_create as $crate::descriptor::CreateFn),
                destroy: Some(docpane_extension_destroy),
            };

        #[no_mangle]
        pub extern "C" fn docpane_extension_create() -> *mut () {
            $crate::descriptor::into_raw_extension(Box::new(<$ty as Default>::default()))
        }

        #[no_mangle]
        pub unsafe extern "C" fn docpane_extension_destroy(raw: *mut ()) {
            unsafe { $crate::descriptor::drop_raw_extension(raw) }
        }
    };
}
