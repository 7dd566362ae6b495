// Helpers shared by benchmark files; dead code analysis can't see across them.
#[allow(dead_code)]
pub fn generate_guide_content(size: usize) -> String {
    let base = "\
Title
=====

Section
-------

Paragraph with a `link <http://example.com>`_, ``code`` and a ref_.

- Bullet point

  - Nested item

- Another item

.. code-block:: rust

   fn example() {
       println!(\"Hello\");
   }

.. note:: Remember the |name| substitution.

.. _ref: http://example.com/ref
.. |name| replace:: *rst-guides*

";
    base.repeat(size)
}

#[allow(dead_code)]
pub fn generate_table(rows: usize) -> String {
    let mut content = String::from("+--------+--------+\n| Key    | Value  |\n+========+========+\n");
    for row in 0..rows {
        content.push_str(&format!("| k{row:<5} | v{row:<5} |\n+--------+--------+\n"));
    }
    content
}
