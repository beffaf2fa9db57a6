mod test_flange_basic;
mod test_frame_basic;
mod test_loft_basic;
