//! Typed method surface shared by the sync and async assertions.

/// Invokes `$emit` with one line per built-in matcher method:
/// `method => "matcherName" (arg: Type, ...);`.
macro_rules! builtin_matchers {
    ($emit:ident) => {
        $emit! {
            /// Identity (`toBe`).
            to_be => "toBe" (expected: impl Into<Value>);
            /// Deep equality (`toEqual`).
            to_equal => "toEqual" (expected: impl Into<Value>);
            /// Deep equality with exact keys and classes (`toStrictEqual`).
            to_strict_equal => "toStrictEqual" (expected: impl Into<Value>);
            to_match_object => "toMatchObject" (expected: impl Into<Value>);
            /// Sequence membership by identity, or substring.
            to_contain => "toContain" (item: impl Into<Value>);
            to_contain_equal => "toContainEqual" (item: impl Into<Value>);
            /// `path` is a dotted string (`a.b[0]`) or an array of keys.
            to_have_property => "toHaveProperty" (path: impl Into<Value>);
            to_have_property_value => "toHaveProperty" (path: impl Into<Value>, value: impl Into<Value>);
            to_have_length => "toHaveLength" (length: usize);
            to_be_truthy => "toBeTruthy" ();
            to_be_falsy => "toBeFalsy" ();
            to_be_null => "toBeNull" ();
            to_be_undefined => "toBeUndefined" ();
            to_be_defined => "toBeDefined" ();
            to_be_nan => "toBeNaN" ();
            to_be_type_of => "toBeTypeOf" (type_name: &str);
            to_be_instance_of => "toBeInstanceOf" (class: &str);
            to_be_greater_than => "toBeGreaterThan" (expected: impl Into<Value>);
            to_be_greater_than_or_equal => "toBeGreaterThanOrEqual" (expected: impl Into<Value>);
            to_be_less_than => "toBeLessThan" (expected: impl Into<Value>);
            to_be_less_than_or_equal => "toBeLessThanOrEqual" (expected: impl Into<Value>);
            /// Uses the configured default precision.
            to_be_close_to => "toBeCloseTo" (expected: f64);
            to_be_close_to_digits => "toBeCloseTo" (expected: f64, digits: u32);
            /// String or regex pattern.
            to_match => "toMatch" (pattern: impl Into<Value>);
            to_throw => "toThrow" ();
            /// `expected` is a message pattern, a regex, an error or an error class.
            to_throw_with => "toThrow" (expected: impl Into<Value>);
            to_throw_error => "toThrowError" ();
            to_throw_error_with => "toThrowError" (expected: impl Into<Value>);
            to_have_been_called => "toHaveBeenCalled" ();
            to_have_been_called_once => "toHaveBeenCalledOnce" ();
            to_have_been_called_times => "toHaveBeenCalledTimes" (times: usize);
            to_have_returned => "toHaveReturned" ();
            to_have_returned_times => "toHaveReturnedTimes" (times: usize);
            to_have_returned_with => "toHaveReturnedWith" (value: impl Into<Value>);
            to_have_last_returned_with => "toHaveLastReturnedWith" (value: impl Into<Value>);
            to_have_nth_returned_with => "toHaveNthReturnedWith" (n: usize, value: impl Into<Value>);
            to_match_snapshot => "toMatchSnapshot" ();
            to_match_named_snapshot => "toMatchSnapshot" (hint: &str);
            to_match_snapshot_properties => "toMatchSnapshot" (properties: impl Into<Value>);
            /// `None` when the call site has no literal yet.
            to_match_inline_snapshot => "toMatchInlineSnapshot" (snapshot: Option<&str>);
            to_match_inline_snapshot_properties => "toMatchInlineSnapshot" (properties: impl Into<Value>, snapshot: Option<&str>);
            to_match_file_snapshot => "toMatchFileSnapshot" (path: &str);
            to_throw_error_matching_snapshot => "toThrowErrorMatchingSnapshot" ();
            to_throw_error_matching_inline_snapshot => "toThrowErrorMatchingInlineSnapshot" (snapshot: Option<&str>);
        }
    };
}

macro_rules! sync_matcher_methods {
    ($($(#[$doc:meta])* $method:ident => $name:literal ($($arg:ident: $ty:ty),*);)*) => {
        $(
            $(#[$doc])*
            pub fn $method(&self, $($arg: $ty),*) -> ExpectResult<&Self> {
                self.call($name, vec![$($arg.into()),*])
            }
        )*
    };
}

macro_rules! async_matcher_methods {
    ($($(#[$doc:meta])* $method:ident => $name:literal ($($arg:ident: $ty:ty),*);)*) => {
        $(
            $(#[$doc])*
            pub async fn $method(&self, $($arg: $ty),*) -> ExpectResult<()> {
                self.call($name, vec![$($arg.into()),*]).await
            }
        )*
    };
}
