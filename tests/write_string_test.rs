mod common;
use common::run;
use proptest::prelude::*;

proptest! {
    #[test]
    fn write_string_fills_its_field(text in "[A-Z]{1,8}", width in 0usize..12) {
        let program = format!(
            "\n LCA '{}'\n LDC I {}\n LDC I {}\n LDC I 5\n CSP WRS\n STP\n",
            text,
            width,
            text.len()
        );
        let (result, output) = run(&program, "");
        prop_assert!(result.is_ok());
        prop_assert_eq!(output.len(), width);
        if width > text.len() {
            prop_assert!(output.ends_with(&text));
            prop_assert!(output[..width - text.len()].chars().all(|c| c == ' '));
        } else {
            prop_assert_eq!(&output[..], &text[..width]);
        }
    }
}
